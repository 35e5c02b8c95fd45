use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CallsConfig;
use crate::db::connection::Database;
use crate::models::CallRecord;

/// Durable storage and sync for sensor records.
#[async_trait]
pub trait SensorEngine: Send + Sync {
    async fn save(&self, record: &CallRecord, table: &str) -> Result<()>;

    /// Flush or synchronize `table`.
    async fn start_sync(&self, table: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Opens the engine a sensor writes to while it is active.
pub type EngineOpener = Arc<dyn Fn(&CallsConfig) -> Result<Arc<dyn SensorEngine>> + Send + Sync>;

#[async_trait]
impl SensorEngine for Database {
    async fn save(&self, record: &CallRecord, table: &str) -> Result<()> {
        if table != CallRecord::TABLE_NAME {
            bail!("unknown table '{table}'");
        }
        self.insert_call(record).await
    }

    async fn start_sync(&self, table: &str) -> Result<()> {
        self.sync_table(table).await
    }

    async fn close(&self) -> Result<()> {
        self.shutdown().await
    }
}

impl Database {
    /// Opener backed by a SQLite file at `CallsConfig::db_path`.
    pub fn opener() -> EngineOpener {
        Arc::new(|config: &CallsConfig| {
            let db = Database::new(config.db_path.clone())?;
            Ok(Arc::new(db) as Arc<dyn SensorEngine>)
        })
    }
}
