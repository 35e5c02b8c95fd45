//! Call log data model.
//!
//! A [`CallRecord`] is one normalized call-log entry plus the context that was
//! current when the sensor captured it.

use serde::{Deserialize, Serialize};

use crate::config::CallsConfig;

/// Call kind as reported by the platform call log.
///
/// Unknown codes are kept as `Other` so the record can still be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum CallType {
    Incoming,
    Outgoing,
    Missed,
    Other(i32),
}

impl CallType {
    pub const INCOMING_CODE: i32 = 1;
    pub const OUTGOING_CODE: i32 = 2;
    pub const MISSED_CODE: i32 = 3;

    pub fn code(self) -> i32 {
        match self {
            CallType::Incoming => Self::INCOMING_CODE,
            CallType::Outgoing => Self::OUTGOING_CODE,
            CallType::Missed => Self::MISSED_CODE,
            CallType::Other(code) => code,
        }
    }
}

impl From<i32> for CallType {
    fn from(code: i32) -> Self {
        match code {
            Self::INCOMING_CODE => CallType::Incoming,
            Self::OUTGOING_CODE => CallType::Outgoing,
            Self::MISSED_CODE => CallType::Missed,
            other => CallType::Other(other),
        }
    }
}

impl From<CallType> for i32 {
    fn from(value: CallType) -> Self {
        value.code()
    }
}

/// The columns read from the most recent call-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLogRow {
    #[serde(rename = "type")]
    pub call_type: CallType,
    /// Call time, epoch milliseconds.
    pub date: i64,
    /// Seconds.
    pub duration: i64,
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Capture time, epoch milliseconds. Not the call time.
    #[serde(rename = "captureTimestamp")]
    pub timestamp: i64,
    pub device_id: String,
    pub label: String,
    pub event_timestamp: i64,
    pub duration: i64,
    /// Remote party number, stored as reported.
    // TODO: hash or redact once a scheme for caller identifiers is agreed on.
    pub trace: Option<String>,
    #[serde(rename = "type")]
    pub call_type: CallType,
}

impl CallRecord {
    pub const TABLE_NAME: &'static str = "calls";

    pub fn capture(row: CallLogRow, config: &CallsConfig, captured_at: i64) -> Self {
        Self {
            timestamp: captured_at,
            device_id: config.device_id.clone(),
            label: config.label.clone(),
            event_timestamp: row.date,
            duration: row.duration,
            trace: row.number,
            call_type: row.call_type,
        }
    }
}
