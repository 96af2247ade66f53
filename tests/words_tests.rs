mod common;

use hsk_deck_core::db::Database;
use hsk_deck_core::services::deck;
use hsk_deck_core::services::users;
use hsk_deck_core::services::words::{self, NewWord, WordError};

fn word(simplified: &str, traditional: &str, pinyin: &str, english: &str) -> NewWord {
    NewWord {
        simplified: simplified.to_string(),
        traditional: traditional.to_string(),
        pinyin: pinyin.to_string(),
        english: english.to_string(),
    }
}

async fn count_word(db: &Database, simplified: &str) -> i64 {
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM "chinese_words" WHERE "simplified" = $1"#)
        .bind(simplified)
        .fetch_one(db.pool())
        .await
        .expect("failed to count words")
}

#[tokio::test]
async fn test_create_words_assigns_level_and_lowercases() {
    let (_tmp, db) = common::open_test_db().await;

    let created = words::create_words(&db, &[word("你好", "你好", "Nǐ Hǎo", "HELLO")], 2)
        .await
        .expect("create_words failed");

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].simplified, "你好");
    assert_eq!(created[0].pinyin, "nǐ hǎo");
    assert_eq!(created[0].english, "hello");
    assert_eq!(created[0].level, 2);
}

#[tokio::test]
async fn test_create_words_duplicate_against_store_rolls_back_batch() {
    let (_tmp, db) = common::open_test_db().await;
    common::seed_dictionary(&db).await;

    let batch = [
        word("天", "天", "tiān", "sky"),
        word("水", "水", "shuǐ", "water"),
        word("地", "地", "dì", "earth"),
    ];
    let result = words::create_words(&db, &batch, 1).await;
    assert!(
        matches!(result, Err(WordError::Duplicate(_))),
        "colliding batch should report Duplicate, got {:?}",
        result
    );

    assert_eq!(count_word(&db, "天").await, 0, "batch head should be rolled back");
    assert_eq!(count_word(&db, "地").await, 0);
    assert_eq!(count_word(&db, "水").await, 1, "stored word should be untouched");
}

#[tokio::test]
async fn test_create_words_duplicate_within_batch_rolls_back() {
    let (_tmp, db) = common::open_test_db().await;

    let batch = [
        word("月", "月", "yuè", "moon"),
        word("月", "月", "yuè", "moon"),
    ];
    let result = words::create_words(&db, &batch, 1).await;
    assert!(
        matches!(result, Err(WordError::Duplicate(_))),
        "batch-internal collision should report Duplicate, got {:?}",
        result
    );
    assert_eq!(count_word(&db, "月").await, 0);
}

#[tokio::test]
async fn test_create_words_rejects_bad_input() {
    let (_tmp, db) = common::open_test_db().await;

    let empty = words::create_words(&db, &[], 1).await;
    assert!(
        matches!(empty, Err(WordError::Validation(_))),
        "empty batch should be rejected, got {:?}",
        empty
    );

    let batch = [word("好", "好", "hǎo", "good"), word("  ", "", "", "")];
    let blank = words::create_words(&db, &batch, 1).await;
    assert!(
        matches!(blank, Err(WordError::Validation(_))),
        "blank simplified should be rejected, got {:?}",
        blank
    );
    assert_eq!(count_word(&db, "好").await, 0, "rejected batch should leave no rows");

    let negative = words::create_words(&db, &[word("好", "好", "hǎo", "good")], -1).await;
    assert!(
        matches!(negative, Err(WordError::Validation(_))),
        "negative level should be rejected, got {:?}",
        negative
    );
}

#[tokio::test]
async fn test_get_word_round_trips_and_misses_cleanly() {
    let (_tmp, db) = common::open_test_db().await;
    let word_ids = common::seed_dictionary(&db).await;

    let found = words::get_word(&db, word_ids[0])
        .await
        .expect("get_word failed")
        .expect("seeded word should exist");
    assert_eq!(found.id, word_ids[0]);
    assert_eq!(found.simplified, "水");
    assert_eq!(found.level, 1);

    let missing = words::get_word(&db, 9999).await.expect("get_word failed");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_list_words_by_level_filters_and_orders() {
    let (_tmp, db) = common::open_test_db().await;
    let level_one_ids = common::seed_dictionary(&db).await;

    words::create_words(
        &db,
        &[word("医院", "醫院", "yī yuàn", "hospital"), word("飞机", "飛機", "fēi jī", "airplane")],
        2,
    )
    .await
    .expect("create_words failed");

    let level_one = words::list_words_by_level(&db, 1).await.expect("list failed");
    let listed: Vec<i64> = level_one.iter().map(|w| w.id).collect();
    assert_eq!(listed, level_one_ids, "level filter should keep insertion order by id");

    let level_two = words::list_words_by_level(&db, 2).await.expect("list failed");
    assert_eq!(level_two.len(), 2);
    assert!(level_two.iter().all(|w| w.level == 2));

    let level_three = words::list_words_by_level(&db, 3).await.expect("list failed");
    assert!(level_three.is_empty());

    let negative = words::list_words_by_level(&db, -1).await;
    assert!(
        matches!(negative, Err(WordError::Validation(_))),
        "negative level should be rejected, got {:?}",
        negative
    );
}

#[tokio::test]
async fn test_remove_word_deletes_referencing_cards() {
    let (_tmp, db) = common::open_test_db().await;
    let word_ids = common::seed_dictionary(&db).await;
    users::create_user(&db, "alice").await.expect("failed to create user");
    deck::add_card(&db, "alice", word_ids[0])
        .await
        .expect("add_card failed");

    let removed = words::remove_word(&db, "水").await.expect("remove_word failed");
    assert_eq!(removed.id, word_ids[0]);

    let cards = deck::list_cards(&db, "alice").await.expect("list failed");
    assert!(cards.is_empty(), "cards of a removed word should be gone");

    let gone = words::get_word(&db, word_ids[0]).await.expect("get_word failed");
    assert!(gone.is_none());

    let again = words::remove_word(&db, "水").await;
    assert!(
        matches!(again, Err(WordError::NotFound(_))),
        "removing twice should be NotFound, got {:?}",
        again
    );
}
