use anyhow::Context;
use sqlx::SqlitePool;

use crate::normalize::RatingCode;

/// Seeds the fixed rating rows. Safe to run on every startup.
pub async fn seed_defaults(pool: &SqlitePool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    for code in RatingCode::ALL {
        sqlx::query(
            "INSERT INTO ratings (code, description) VALUES ($1, $2) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(code.as_str())
        .bind(code.description())
        .execute(&mut *tx)
        .await
        .context("seed ratings failed")?;
    }

    tx.commit().await.context("commit transaction failed")?;
    tracing::debug!("rating codes seeded");
    Ok(())
}
