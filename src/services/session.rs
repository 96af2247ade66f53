use serde::Serialize;

use crate::db::Database;

/// Number of states in the review cycle.
pub const SESSION_CYCLE_LENGTH: i64 = 10;

/// Result of one session advance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAdvance {
    pub session_number: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Transition function for the per-user session counter.
///
/// Note the asymmetry: a counter created at 0 passes through 1..=9 and
/// then lands on 10 (9 % 10 + 1) instead of wrapping to 0, so the
/// steady-state cycle is 1..=10. Changing this to a conventional 0..=9
/// wrap would shift every stored counter, so the arithmetic stays put.
pub fn next_session_number(current: i64) -> i64 {
    (current % SESSION_CYCLE_LENGTH) + 1
}

/// Advances a user's session counter by one step and returns the new value.
///
/// Read and write happen in the same statement, so N concurrent calls
/// advance the counter exactly N times. Not idempotent across calls.
pub async fn advance_session(db: &Database, username: &str) -> Result<SessionAdvance, SessionError> {
    let row: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE "users"
        SET "session_number" = ("session_number" % 10) + 1
        WHERE "username" = $1
        RETURNING "session_number"
        "#,
    )
    .bind(username)
    .fetch_optional(db.pool())
    .await?;

    let Some(session_number) = row else {
        return Err(SessionError::NotFound(format!("user does not exist: {}", username)));
    };
    Ok(SessionAdvance { session_number })
}
