use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{History, NewHistory};

pub async fn create(pool: &PgPool, history: &NewHistory) -> Result<History, sqlx::Error> {
    sqlx::query_as::<_, History>(
        "INSERT INTO histories (process_id, sender, receiver, content, role_as, created_at)
         VALUES ($1, $2, $3, $4, $5, COALESCE($6, now())) RETURNING *",
    )
    .bind(history.process_id)
    .bind(&history.sender)
    .bind(&history.receiver)
    .bind(&history.content)
    .bind(&history.role_as)
    .bind(history.created_at)
    .fetch_one(pool)
    .await
}

pub async fn list_by_process(pool: &PgPool, process_id: i64) -> Result<Vec<History>, sqlx::Error> {
    sqlx::query_as::<_, History>(
        "SELECT * FROM histories WHERE process_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(process_id)
    .fetch_all(pool)
    .await
}

/// Single-statement bulk delete. Returns the number of rows removed.
pub async fn delete_before(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM histories WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
