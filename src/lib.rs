//! Call activity sensor.
//!
//! Watches a call log and the telephony call state, stores one [`CallRecord`]
//! per call-log change and publishes [`CallSignal`]s to in-process listeners.
//!
//! ```no_run
//! use std::sync::Arc;
//! use calls_sensor::{
//!     platform::{ManualTelephony, MemoryCallLog, StaticPermissions},
//!     CallsConfig, CallsSensor, Platform,
//! };
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let platform = Platform {
//!     call_log: Arc::new(MemoryCallLog::new()),
//!     telephony: Arc::new(ManualTelephony::new()),
//!     permissions: Arc::new(StaticPermissions::all()),
//! };
//! let sensor = Arc::new(CallsSensor::with_database(platform, CallsConfig::default()));
//! let mut signals = sensor.subscribe();
//! sensor.start(None).await?;
//! while let Ok(signal) = signals.recv().await {
//!     println!("{}", signal.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod dispatch;
pub mod models;
pub mod observer;
pub mod platform;
pub mod service;
pub mod signals;
pub mod watchers;
mod utils;

#[cfg(test)]
mod test_support;

pub use config::{CallsConfig, ConfigHandle};
pub use db::{Database, EngineOpener, SensorEngine};
pub use models::{CallLogRow, CallRecord, CallState, CallStateChange, CallType};
pub use observer::CallsObserver;
pub use platform::{Permission, Platform, REQUIRED_PERMISSIONS};
pub use service::{CallsSensor, Command, SensorStatus, StartMode};
pub use signals::{CallSignal, SignalBus};
pub use utils::logging::init_logging;
