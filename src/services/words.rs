use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::Database;

/// Input shape for a dictionary entry, as supplied by admin callers and
/// the bundled seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub simplified: String,
    pub traditional: String,
    pub pinyin: String,
    pub english: String,
}

/// A stored dictionary entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: i64,
    pub simplified: String,
    pub traditional: String,
    pub pinyin: String,
    pub english: String,
    pub level: i64,
    pub created_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WordError {
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Inserts a batch of dictionary entries at one difficulty level.
///
/// The whole batch runs in one transaction: a `simplified` collision,
/// whether with stored words or within the batch itself, rolls every
/// entry back and reports `Duplicate`. Pinyin and english are stored
/// lowercased.
pub async fn create_words(
    db: &Database,
    entries: &[NewWord],
    level: i64,
) -> Result<Vec<Word>, WordError> {
    if entries.is_empty() {
        return Err(WordError::Validation("word batch must not be empty".to_string()));
    }
    if level < 0 {
        return Err(WordError::Validation(format!(
            "level must not be negative, got {}",
            level
        )));
    }

    let now = Utc::now().naive_utc();
    let mut tx = db.pool().begin().await?;
    let mut created = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.simplified.trim().is_empty() {
            return Err(WordError::Validation(
                "simplified form must not be blank".to_string(),
            ));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO "chinese_words"
                ("simplified", "traditional", "pinyin", "english", "level", "created_at")
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ("simplified") DO NOTHING
            RETURNING "id", "simplified", "traditional", "pinyin", "english", "level", "created_at"
            "#,
        )
        .bind(&entry.simplified)
        .bind(&entry.traditional)
        .bind(entry.pinyin.to_lowercase())
        .bind(entry.english.to_lowercase())
        .bind(level)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction on this path rolls the batch back.
        let Some(row) = row else {
            return Err(WordError::Duplicate(format!(
                "word already exists: {}",
                entry.simplified
            )));
        };
        created.push(map_word(&row)?);
    }

    tx.commit().await?;
    Ok(created)
}

/// Point lookup by word id.
pub async fn get_word(db: &Database, word_id: i64) -> Result<Option<Word>, WordError> {
    let row = sqlx::query(
        r#"
        SELECT "id", "simplified", "traditional", "pinyin", "english", "level", "created_at"
        FROM "chinese_words"
        WHERE "id" = $1
        LIMIT 1
        "#,
    )
    .bind(word_id)
    .fetch_optional(db.pool())
    .await?;

    match row {
        Some(row) => Ok(Some(map_word(&row)?)),
        None => Ok(None),
    }
}

/// All dictionary entries at an exact difficulty level, ordered by id.
pub async fn list_words_by_level(db: &Database, level: i64) -> Result<Vec<Word>, WordError> {
    if level < 0 {
        return Err(WordError::Validation(format!(
            "level must not be negative, got {}",
            level
        )));
    }

    let rows = sqlx::query(
        r#"
        SELECT "id", "simplified", "traditional", "pinyin", "english", "level", "created_at"
        FROM "chinese_words"
        WHERE "level" = $1
        ORDER BY "id" ASC
        "#,
    )
    .bind(level)
    .fetch_all(db.pool())
    .await?;

    let mut words = Vec::with_capacity(rows.len());
    for row in &rows {
        words.push(map_word(row)?);
    }
    Ok(words)
}

/// Removes a dictionary entry by its simplified form and returns it.
/// Cards referencing the word are deleted by the cascade rule.
pub async fn remove_word(db: &Database, simplified: &str) -> Result<Word, WordError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "chinese_words"
        WHERE "simplified" = $1
        RETURNING "id", "simplified", "traditional", "pinyin", "english", "level", "created_at"
        "#,
    )
    .bind(simplified)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Err(WordError::NotFound(format!("word does not exist: {}", simplified)));
    };
    Ok(map_word(&row)?)
}

fn map_word(row: &SqliteRow) -> Result<Word, sqlx::Error> {
    let created_at: NaiveDateTime = row.try_get("created_at")?;
    Ok(Word {
        id: row.try_get("id")?,
        simplified: row.try_get("simplified")?,
        traditional: row.try_get("traditional")?,
        pinyin: row.try_get("pinyin")?,
        english: row.try_get("english")?,
        level: row.try_get("level")?,
        created_at: format_naive_iso(created_at),
    })
}

fn format_naive_iso(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
