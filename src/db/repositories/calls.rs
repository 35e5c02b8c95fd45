use anyhow::{bail, Context, Result};
use log::info;
use rusqlite::{params, Row};

use crate::db::connection::Database;
use crate::models::{CallRecord, CallType};

fn row_to_call(row: &Row) -> rusqlite::Result<CallRecord> {
    Ok(CallRecord {
        timestamp: row.get("timestamp")?,
        device_id: row.get("device_id")?,
        label: row.get("label")?,
        event_timestamp: row.get("event_timestamp")?,
        duration: row.get("duration")?,
        trace: row.get("trace")?,
        call_type: CallType::from(row.get::<_, i32>("call_type")?),
    })
}

impl Database {
    pub async fn insert_call(&self, record: &CallRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO calls
                    (timestamp, device_id, label, event_timestamp, duration, trace, call_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.timestamp,
                    record.device_id,
                    record.label,
                    record.event_timestamp,
                    record.duration,
                    record.trace,
                    record.call_type.code(),
                ],
            )
            .with_context(|| "failed to insert call record")?;
            Ok(())
        })
        .await
    }

    /// All stored calls in insertion order.
    pub async fn get_calls(&self) -> Result<Vec<CallRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT timestamp, device_id, label, event_timestamp, duration, trace, call_type
                 FROM calls
                 ORDER BY id ASC",
            )?;

            let calls = stmt
                .query_map([], row_to_call)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("failed to read call records")?;

            Ok(calls)
        })
        .await
    }

    pub async fn count_calls(&self) -> Result<i64> {
        self.execute(|conn| {
            conn.query_row("SELECT COUNT(*) FROM calls", [], |row| row.get(0))
                .context("failed to count call records")
        })
        .await
    }

    /// Flushes the WAL into the main database file.
    pub async fn sync_table(&self, table: &str) -> Result<()> {
        if table != CallRecord::TABLE_NAME {
            bail!("unknown table '{table}'");
        }

        let rows = self.count_calls().await?;
        let (busy, log_frames, checkpointed) = self
            .execute(|conn| {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })
                .context("failed to checkpoint database")
            })
            .await?;

        info!(
            "Synced table {table}: {rows} rows, \
             {checkpointed}/{log_frames} frames checkpointed (busy={busy})"
        );
        Ok(())
    }
}
