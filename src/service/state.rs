use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SensorStatus {
    #[default]
    Created,
    Active,
    Stopped,
}

/// Whether the host should restart the sensor on its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StartMode {
    Sticky,
    /// Activation was refused; do not restart automatically.
    NotSticky,
}
