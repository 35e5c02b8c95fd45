//! Conditional logging macros gated on the sensor's `debug` flag.
//!
//! Usage:
//! ```ignore
//! use crate::log_debug;
//!
//! let config = handle.snapshot();
//! log_debug!(config.debug, "call-accepted");
//! ```

/// Logs at debug level only when the given flag is set.
///
/// Event chatter (every signal the sensor emits) goes through this macro so a
/// host can turn it on per sensor via `CallsConfig::debug`.
#[macro_export]
macro_rules! log_debug {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            log::debug!($($arg)*);
        }
    };
}

/// Initialize `env_logger` with an `info` default that `RUST_LOG` can override.
///
/// Returns an error instead of panicking when a logger is already installed.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
}
