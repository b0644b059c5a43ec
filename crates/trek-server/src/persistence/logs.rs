//! Activity log persistence operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use trek_core::ActivityLog;

/// Upsert a log into the database.
pub async fn upsert_log(pool: &SqlitePool, log: &ActivityLog) -> Result<()> {
    let steps = i64::try_from(log.steps).context("step count out of range")?;

    sqlx::query(
        r#"
        INSERT INTO logs (id, member_id, steps, date, timestamp, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
        ON CONFLICT(id) DO UPDATE SET
            steps = ?3, date = ?4, timestamp = ?5,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&log.id)
    .bind(&log.member_id)
    .bind(steps)
    .bind(log.date.to_rfc3339())
    .bind(log.timestamp)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a log by ID.
pub async fn delete_log(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM logs WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all logs, oldest first.
pub async fn load_all_logs(pool: &SqlitePool) -> Result<Vec<ActivityLog>> {
    let rows = sqlx::query_as::<_, LogRow>(
        "SELECT id, member_id, steps, date, timestamp FROM logs ORDER BY timestamp ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct LogRow {
    id: String,
    member_id: String,
    steps: i64,
    date: String,
    timestamp: i64,
}

impl TryFrom<LogRow> for ActivityLog {
    type Error = anyhow::Error;

    fn try_from(row: LogRow) -> Result<Self> {
        let steps = u64::try_from(row.steps)
            .with_context(|| format!("negative step count on log {}", row.id))?;
        let date = DateTime::parse_from_rfc3339(&row.date)
            .with_context(|| format!("bad date on log {}", row.id))?
            .with_timezone(&Utc);

        Ok(ActivityLog {
            id: row.id,
            member_id: row.member_id,
            steps,
            date,
            timestamp: row.timestamp,
        })
    }
}
