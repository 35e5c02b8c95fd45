use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{db::SensorEngine, models::CallRecord};

/// Forwards "sync now" requests for the calls table to the storage engine.
pub struct SyncBridge {
    engine: Arc<dyn SensorEngine>,
}

impl SyncBridge {
    pub fn new(engine: Arc<dyn SensorEngine>) -> Self {
        Self { engine }
    }

    pub async fn sync(&self) -> Result<()> {
        self.engine
            .start_sync(CallRecord::TABLE_NAME)
            .await
            .context("calls table sync failed")
    }
}
