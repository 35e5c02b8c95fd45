pub mod commands;
pub mod controller;
pub mod state;
pub mod sync;

pub use commands::Command;
pub use controller::CallsSensor;
pub use state::{SensorStatus, StartMode};
pub use sync::SyncBridge;
