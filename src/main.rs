use hsk_deck_core::config::Config;
use hsk_deck_core::db::Database;
use hsk_deck_core::logging;
use hsk_deck_core::seed;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = logging::init_tracing(&config.log);

    let db = match Database::connect(&config.db).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "failed to open deck store");
            std::process::exit(1);
        }
    };

    seed::seed_demo_data(&db).await;

    match store_counts(&db).await {
        Ok((users, words, cards)) => {
            tracing::info!(users = users, words = words, cards = cards, "deck store ready");
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to read store counts");
        }
    }

    db.close().await;
}

async fn store_counts(db: &Database) -> Result<(i64, i64, i64), sqlx::Error> {
    let users: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "users""#)
        .fetch_one(db.pool())
        .await?;
    let words: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "chinese_words""#)
        .fetch_one(db.pool())
        .await?;
    let cards: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "cards""#)
        .fetch_one(db.pool())
        .await?;
    Ok((users, words, cards))
}
