use serde::{Deserialize, Serialize};

/// Telephony call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum CallState {
    Idle,
    Ringing,
    /// A call is active or on hold.
    OffHook,
    Other(i32),
}

impl CallState {
    pub fn code(self) -> i32 {
        match self {
            CallState::Idle => 0,
            CallState::Ringing => 1,
            CallState::OffHook => 2,
            CallState::Other(code) => code,
        }
    }
}

impl From<i32> for CallState {
    fn from(code: i32) -> Self {
        match code {
            0 => CallState::Idle,
            1 => CallState::Ringing,
            2 => CallState::OffHook,
            other => CallState::Other(other),
        }
    }
}

impl From<CallState> for i32 {
    fn from(value: CallState) -> Self {
        value.code()
    }
}

/// One transition as delivered by the telephony source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStateChange {
    pub state: CallState,
    pub number: Option<String>,
}

impl CallStateChange {
    pub fn new(state: CallState, number: Option<&str>) -> Self {
        Self {
            state,
            number: number.map(str::to_string),
        }
    }
}
