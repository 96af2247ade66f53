use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::Database;

/// A stored user account. Authentication lives outside this crate; the
/// account row only carries the identifier and the session counter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub session_number: i64,
    pub created_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Creates a user with its session counter at 0.
pub async fn create_user(db: &Database, username: &str) -> Result<User, UserError> {
    if username.trim().is_empty() {
        return Err(UserError::Validation("username must not be blank".to_string()));
    }

    let now = Utc::now().naive_utc();
    let row = sqlx::query(
        r#"
        INSERT INTO "users" ("username", "session_number", "created_at")
        VALUES ($1, 0, $2)
        ON CONFLICT ("username") DO NOTHING
        RETURNING "username", "session_number", "created_at"
        "#,
    )
    .bind(username)
    .bind(now)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Err(UserError::Duplicate(format!("user already exists: {}", username)));
    };
    Ok(map_user(&row)?)
}

/// Point lookup by username.
pub async fn get_user(db: &Database, username: &str) -> Result<Option<User>, UserError> {
    let row = sqlx::query(
        r#"
        SELECT "username", "session_number", "created_at"
        FROM "users"
        WHERE "username" = $1
        LIMIT 1
        "#,
    )
    .bind(username)
    .fetch_optional(db.pool())
    .await?;

    match row {
        Some(row) => Ok(Some(map_user(&row)?)),
        None => Ok(None),
    }
}

/// All users ordered by username.
pub async fn list_users(db: &Database) -> Result<Vec<User>, UserError> {
    let rows = sqlx::query(
        r#"
        SELECT "username", "session_number", "created_at"
        FROM "users"
        ORDER BY "username" ASC
        "#,
    )
    .fetch_all(db.pool())
    .await?;

    let mut users = Vec::with_capacity(rows.len());
    for row in &rows {
        users.push(map_user(row)?);
    }
    Ok(users)
}

/// Removes a user and returns the username. The user's cards are deleted
/// by the cascade rule.
pub async fn remove_user(db: &Database, username: &str) -> Result<String, UserError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "users"
        WHERE "username" = $1
        RETURNING "username"
        "#,
    )
    .bind(username)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Err(UserError::NotFound(format!("user does not exist: {}", username)));
    };
    Ok(row.try_get("username")?)
}

fn map_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let created_at: NaiveDateTime = row.try_get("created_at")?;
    Ok(User {
        username: row.try_get("username")?,
        session_number: row.try_get("session_number")?,
        created_at: format_naive_iso(created_at),
    })
}

fn format_naive_iso(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
