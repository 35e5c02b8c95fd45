use anyhow::Result;
use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};
use tokio::sync::mpsc;

use super::{CallLogSource, Permission, PermissionChecker, TelephonySource, REQUIRED_PERMISSIONS};
use crate::models::{CallLogRow, CallState, CallStateChange};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Call log kept in memory. Hosts push rows with [`MemoryCallLog::insert`].
#[derive(Default)]
pub struct MemoryCallLog {
    rows: Mutex<Vec<CallLogRow>>,
    observers: Mutex<Vec<mpsc::UnboundedSender<()>>>,
}

impl MemoryCallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, row: CallLogRow) {
        lock(&self.rows).push(row);
        self.notify_change();
    }

    /// Notifies observers without adding a row.
    pub fn notify_change(&self) {
        lock(&self.observers).retain(|tx| tx.send(()).is_ok());
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.observers)
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl CallLogSource for MemoryCallLog {
    fn latest_call(&self) -> Result<Option<CallLogRow>> {
        let rows = lock(&self.rows);
        // Later inserts win ties on date.
        Ok(rows.iter().max_by_key(|row| row.date).cloned())
    }

    fn register(&self) -> Result<mpsc::UnboundedReceiver<()>> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.observers).push(tx);
        Ok(rx)
    }
}

/// Telephony source driven by explicit [`ManualTelephony::transition`] calls.
#[derive(Default)]
pub struct ManualTelephony {
    listeners: Mutex<Vec<mpsc::UnboundedSender<CallStateChange>>>,
}

impl ManualTelephony {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(&self, state: CallState, number: Option<&str>) {
        let change = CallStateChange::new(state, number);
        lock(&self.listeners).retain(|tx| tx.send(change.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners)
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl TelephonySource for ManualTelephony {
    fn listen(&self) -> Result<mpsc::UnboundedReceiver<CallStateChange>> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.listeners).push(tx);
        Ok(rx)
    }
}

/// Fixed set of granted permissions.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<Permission>,
}

impl StaticPermissions {
    pub fn all() -> Self {
        Self::granting(REQUIRED_PERMISSIONS)
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn granting(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: permissions.into_iter().collect(),
        }
    }
}

impl PermissionChecker for StaticPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
