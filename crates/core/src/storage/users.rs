use anyhow::Context;
use sqlx::SqlitePool;

use crate::domain::user::User;

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT id, email, password_hash FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("select user by email failed")
}

/// Inserts a new account. Returns `None` when the email is already
/// registered; the UNIQUE index is the authority, so this also covers
/// callers racing past a pre-check.
pub async fn insert(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<Option<i64>> {
    let res = sqlx::query("INSERT INTO users (email, password_hash) VALUES ($1, $2)")
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await;

    match res {
        Ok(done) => Ok(Some(done.last_insert_rowid())),
        Err(sqlx::Error::Database(db))
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Ok(None)
        }
        Err(err) => Err(err).context("insert user failed"),
    }
}
