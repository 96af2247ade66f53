use tempfile::TempDir;

use hsk_deck_core::config::DbConfig;
use hsk_deck_core::db::Database;
use hsk_deck_core::services::words::{self, NewWord};

/// Opens a fresh migrated store under a temp directory. Keep the TempDir
/// alive for the duration of the test; dropping it deletes the database.
pub async fn open_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("deck.db");

    let db = Database::connect(&DbConfig::at_path(db_path))
        .await
        .expect("failed to open test database");

    (temp_dir, db)
}

pub fn sample_words() -> Vec<NewWord> {
    vec![
        NewWord {
            simplified: "水".to_string(),
            traditional: "水".to_string(),
            pinyin: "shuǐ".to_string(),
            english: "water".to_string(),
        },
        NewWord {
            simplified: "火".to_string(),
            traditional: "火".to_string(),
            pinyin: "huǒ".to_string(),
            english: "fire".to_string(),
        },
        NewWord {
            simplified: "学习".to_string(),
            traditional: "學習".to_string(),
            pinyin: "xué xí".to_string(),
            english: "to study".to_string(),
        },
    ]
}

/// Inserts the sample dictionary at level 1 and returns the new word ids
/// in insertion order.
pub async fn seed_dictionary(db: &Database) -> Vec<i64> {
    let created = words::create_words(db, &sample_words(), 1)
        .await
        .expect("failed to seed dictionary");
    created.iter().map(|word| word.id).collect()
}
