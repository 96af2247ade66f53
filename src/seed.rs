use sqlx::Row;

use crate::db::Database;
use crate::services::words::NewWord;

const DEMO_USERNAME: &str = "local_user";
const SEED_WORDS_LEVEL: i64 = 1;
const SEED_WORDS_JSON: &str = include_str!("../data/hsk_level1_words.json");

/// Seeds the bundled HSK level-1 word list and a local demo user.
/// Every row is inserted only when absent, so re-running is harmless.
pub async fn seed_demo_data(db: &Database) {
    seed_words(db).await;
    seed_demo_user(db).await;
}

async fn seed_words(db: &Database) {
    let entries: Vec<NewWord> = match serde_json::from_str(SEED_WORDS_JSON) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::error!(error = %err, "embedded seed word list is malformed");
            return;
        }
    };

    let pool = db.pool();
    let mut seeded = 0usize;

    for entry in &entries {
        let existing: Option<i64> =
            sqlx::query(r#"SELECT "id" FROM "chinese_words" WHERE "simplified" = $1"#)
                .bind(&entry.simplified)
                .fetch_optional(pool)
                .await
                .ok()
                .flatten()
                .and_then(|row| row.try_get("id").ok());

        if existing.is_some() {
            continue;
        }

        let created_at = chrono::Utc::now().naive_utc();
        if let Err(err) = sqlx::query(
            r#"
            INSERT INTO "chinese_words"
                ("simplified", "traditional", "pinyin", "english", "level", "created_at")
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.simplified)
        .bind(&entry.traditional)
        .bind(entry.pinyin.to_lowercase())
        .bind(entry.english.to_lowercase())
        .bind(SEED_WORDS_LEVEL)
        .bind(created_at)
        .execute(pool)
        .await
        {
            tracing::warn!(error = %err, simplified = %entry.simplified, "failed to seed word");
        } else {
            seeded += 1;
        }
    }

    if seeded > 0 {
        tracing::info!(seeded = seeded, total = entries.len(), "seeded dictionary words");
    } else {
        tracing::debug!(total = entries.len(), "dictionary words already seeded");
    }
}

async fn seed_demo_user(db: &Database) {
    let pool = db.pool();

    let existing: Option<String> =
        sqlx::query(r#"SELECT "username" FROM "users" WHERE "username" = $1"#)
            .bind(DEMO_USERNAME)
            .fetch_optional(pool)
            .await
            .ok()
            .flatten()
            .and_then(|row| row.try_get("username").ok());

    if existing.is_some() {
        tracing::debug!("demo user already exists");
        return;
    }

    let created_at = chrono::Utc::now().naive_utc();
    if let Err(err) = sqlx::query(
        r#"INSERT INTO "users" ("username", "session_number", "created_at") VALUES ($1, 0, $2)"#,
    )
    .bind(DEMO_USERNAME)
    .bind(created_at)
    .execute(pool)
    .await
    {
        tracing::warn!(error = %err, "failed to seed demo user");
    } else {
        tracing::info!(username = DEMO_USERNAME, "seeded demo user");
    }
}
