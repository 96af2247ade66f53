use chrono::Utc;
use serde::Serialize;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::Database;

/// Default review bucket for a freshly added card.
pub const DEFAULT_GROUP_NUMBER: i64 = 0;

/// A card joined with the display fields of its word.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub word_id: i64,
    pub group_number: i64,
    pub simplified: String,
    pub traditional: String,
    pub pinyin: String,
    pub english: String,
}

/// The ownership row itself, as returned by the mutating operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub username: String,
    pub word_id: i64,
    pub group_number: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// All cards of a user joined with their words, ordered by word id.
/// An unknown user or an empty deck yields an empty Vec, not an error.
pub async fn list_cards(db: &Database, username: &str) -> Result<Vec<CardRecord>, DeckError> {
    let rows = sqlx::query(
        r#"
        SELECT c."word_id", c."group_number",
               w."simplified", w."traditional", w."pinyin", w."english"
        FROM "cards" c
        JOIN "chinese_words" w ON w."id" = c."word_id"
        WHERE c."username" = $1
        ORDER BY c."word_id" ASC
        "#,
    )
    .bind(username)
    .fetch_all(db.pool())
    .await?;

    let mut cards = Vec::with_capacity(rows.len());
    for row in &rows {
        cards.push(map_card_record(row)?);
    }
    Ok(cards)
}

/// The subset of a user's cards sitting in one review bucket, ordered by
/// word id. Any non-negative bucket is a legal query and may be empty.
pub async fn list_cards_by_group(
    db: &Database,
    username: &str,
    group_number: i64,
) -> Result<Vec<CardRecord>, DeckError> {
    if group_number < 0 {
        return Err(DeckError::Validation(format!(
            "group number must not be negative, got {}",
            group_number
        )));
    }

    let rows = sqlx::query(
        r#"
        SELECT c."word_id", c."group_number",
               w."simplified", w."traditional", w."pinyin", w."english"
        FROM "cards" c
        JOIN "chinese_words" w ON w."id" = c."word_id"
        WHERE c."username" = $1 AND c."group_number" = $2
        ORDER BY c."word_id" ASC
        "#,
    )
    .bind(username)
    .bind(group_number)
    .fetch_all(db.pool())
    .await?;

    let mut cards = Vec::with_capacity(rows.len());
    for row in &rows {
        cards.push(map_card_record(row)?);
    }
    Ok(cards)
}

/// Adds a card for (username, word_id) starting in the default group.
///
/// The insert is a single conditional statement: the composite primary
/// key closes the duplicate race, so two concurrent calls for the same
/// pair resolve to exactly one `Ok` and one `Duplicate`.
pub async fn add_card(db: &Database, username: &str, word_id: i64) -> Result<Card, DeckError> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"
        INSERT INTO "cards" ("username", "word_id", "group_number", "created_at")
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ("username", "word_id") DO NOTHING
        RETURNING "username", "word_id", "group_number"
        "#,
    )
    .bind(username)
    .bind(word_id)
    .bind(DEFAULT_GROUP_NUMBER)
    .bind(now)
    .fetch_optional(db.pool())
    .await;

    match result {
        Ok(Some(row)) => Ok(map_card(&row)?),
        Ok(None) => Err(DeckError::Duplicate(format!(
            "card already exists for user {} and word {}",
            username, word_id
        ))),
        Err(sqlx::Error::Database(db_err)) if db_err.kind() == ErrorKind::ForeignKeyViolation => {
            Err(resolve_missing_reference(db, username, word_id).await)
        }
        Err(err) => Err(err.into()),
    }
}

/// Moves a card to the caller-chosen review bucket and returns it.
///
/// The bucket policy lives with the caller; this only persists the
/// decision. Zero updated rows means the card does not exist.
pub async fn update_group(
    db: &Database,
    username: &str,
    word_id: i64,
    group_number: i64,
) -> Result<Card, DeckError> {
    if group_number < 0 {
        return Err(DeckError::Validation(format!(
            "group number must not be negative, got {}",
            group_number
        )));
    }

    let row = sqlx::query(
        r#"
        UPDATE "cards"
        SET "group_number" = $3
        WHERE "username" = $1 AND "word_id" = $2
        RETURNING "username", "word_id", "group_number"
        "#,
    )
    .bind(username)
    .bind(word_id)
    .bind(group_number)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Err(DeckError::NotFound(format!(
            "card does not exist for user {} and word {}",
            username, word_id
        )));
    };
    Ok(map_card(&row)?)
}

/// Removes a card and returns the word id it pointed at.
pub async fn delete_card(db: &Database, username: &str, word_id: i64) -> Result<i64, DeckError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "cards"
        WHERE "username" = $1 AND "word_id" = $2
        RETURNING "word_id"
        "#,
    )
    .bind(username)
    .bind(word_id)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Err(DeckError::NotFound(format!(
            "card does not exist for user {} and word {}",
            username, word_id
        )));
    };
    Ok(row.try_get("word_id")?)
}

// A foreign-key violation on insert does not say which side is missing,
// so probe the user row to name the absent reference precisely.
async fn resolve_missing_reference(db: &Database, username: &str, word_id: i64) -> DeckError {
    let user_count: Result<i64, sqlx::Error> =
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM "users" WHERE "username" = $1"#)
            .bind(username)
            .fetch_one(db.pool())
            .await;

    match user_count {
        Ok(0) => DeckError::NotFound(format!("user does not exist: {}", username)),
        Ok(_) => DeckError::NotFound(format!("word does not exist: {}", word_id)),
        Err(err) => DeckError::Sql(err),
    }
}

fn map_card_record(row: &SqliteRow) -> Result<CardRecord, sqlx::Error> {
    Ok(CardRecord {
        word_id: row.try_get("word_id")?,
        group_number: row.try_get("group_number")?,
        simplified: row.try_get("simplified")?,
        traditional: row.try_get("traditional")?,
        pinyin: row.try_get("pinyin")?,
        english: row.try_get("english")?,
    })
}

fn map_card(row: &SqliteRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        username: row.try_get("username")?,
        word_id: row.try_get("word_id")?,
        group_number: row.try_get("group_number")?,
    })
}
