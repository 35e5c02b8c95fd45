//! Test doubles shared by unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::{
    db::SensorEngine,
    models::{CallLogRow, CallRecord},
    observer::CallsObserver,
    platform::{CallLogSource, MemoryCallLog},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    Call(CallRecord),
    Ringing(Option<String>),
    Busy(Option<String>),
    Free(Option<String>),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: ObserverEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl CallsObserver for RecordingObserver {
    fn on_call(&self, record: &CallRecord) {
        self.push(ObserverEvent::Call(record.clone()));
    }

    fn on_ringing(&self, number: Option<&str>) {
        self.push(ObserverEvent::Ringing(number.map(str::to_string)));
    }

    fn on_busy(&self, number: Option<&str>) {
        self.push(ObserverEvent::Busy(number.map(str::to_string)));
    }

    fn on_free(&self, number: Option<&str>) {
        self.push(ObserverEvent::Free(number.map(str::to_string)));
    }
}

#[derive(Default)]
pub struct MemoryEngine {
    saved: Mutex<Vec<(String, CallRecord)>>,
    syncs: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl MemoryEngine {
    pub fn saved(&self) -> Vec<(String, CallRecord)> {
        self.saved.lock().unwrap().clone()
    }

    pub fn syncs(&self) -> Vec<String> {
        self.syncs.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

#[async_trait]
impl SensorEngine for MemoryEngine {
    async fn save(&self, record: &CallRecord, table: &str) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((table.to_string(), record.clone()));
        Ok(())
    }

    async fn start_sync(&self, table: &str) -> Result<()> {
        self.syncs.lock().unwrap().push(table.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

pub struct FailingEngine;

#[async_trait]
impl SensorEngine for FailingEngine {
    async fn save(&self, _record: &CallRecord, _table: &str) -> Result<()> {
        Err(anyhow!("disk full"))
    }

    async fn start_sync(&self, _table: &str) -> Result<()> {
        Err(anyhow!("offline"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Call log whose first `failures` queries error out before it behaves
/// like a [`MemoryCallLog`].
pub struct FlakyCallLog {
    inner: MemoryCallLog,
    failures: Mutex<usize>,
}

impl FlakyCallLog {
    pub fn failing_once() -> Self {
        Self {
            inner: MemoryCallLog::new(),
            failures: Mutex::new(1),
        }
    }

    pub fn insert(&self, row: CallLogRow) {
        self.inner.insert(row);
    }
}

impl CallLogSource for FlakyCallLog {
    fn latest_call(&self) -> Result<Option<CallLogRow>> {
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(anyhow!("cursor unavailable"));
        }
        drop(failures);
        self.inner.latest_call()
    }

    fn register(&self) -> Result<mpsc::UnboundedReceiver<()>> {
        self.inner.register()
    }
}
