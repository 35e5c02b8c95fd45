use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf, sync::Arc};
use tokio::sync::watch;
use uuid::Uuid;

use crate::observer::CallsObserver;

const DEFAULT_DB_PATH: &str = "aware_calls.sqlite3";

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallsConfig {
    /// Start automatically when the host sends `start-enabled`.
    pub enabled: bool,
    pub debug: bool,
    pub label: String,
    pub device_id: String,
    pub db_path: PathBuf,
    #[serde(skip)]
    pub observer: Option<Arc<dyn CallsObserver>>,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debug: false,
            label: String::new(),
            device_id: Uuid::new_v4().to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            observer: None,
        }
    }
}

impl fmt::Debug for CallsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallsConfig")
            .field("enabled", &self.enabled)
            .field("debug", &self.debug)
            .field("label", &self.label)
            .field("device_id", &self.device_id)
            .field("db_path", &self.db_path)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl CallsConfig {
    /// Reads a JSON config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn replace_with(&mut self, other: CallsConfig) {
        self.enabled = other.enabled;
        self.debug = other.debug;
        self.label = other.label;
        self.device_id = other.device_id;
        self.db_path = other.db_path;
        self.observer = other.observer;
    }
}

/// Shared handle to the latest configuration.
///
/// Readers take a snapshot per event; writers publish a new value. Values
/// already copied out of a snapshot are never touched by later updates.
#[derive(Clone)]
pub struct ConfigHandle {
    tx: Arc<watch::Sender<CallsConfig>>,
}

impl ConfigHandle {
    pub fn new(config: CallsConfig) -> Self {
        let (tx, _rx) = watch::channel(config);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> CallsConfig {
        self.tx.borrow().clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        self.tx.send_modify(|config| config.label = label);
    }

    pub fn replace_with(&self, other: CallsConfig) {
        self.tx.send_modify(|config| config.replace_with(other));
    }
}
