mod connection;
mod engine;
mod migrations;
mod repositories;

pub use connection::Database;
pub use engine::{EngineOpener, SensorEngine};
