use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const SIGNAL_CAPACITY: usize = 64;

/// Named events the sensor publishes to in-process listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "kebab-case")]
pub enum CallSignal {
    /// Call accepted by the user.
    CallAccepted,
    /// Call unanswered.
    CallMissed,
    /// Call attempt by the user.
    CallMade,
    Ringing { number: Option<String> },
    UserInCall,
    UserNotInCall,
}

impl CallSignal {
    pub fn name(&self) -> &'static str {
        match self {
            CallSignal::CallAccepted => "call-accepted",
            CallSignal::CallMissed => "call-missed",
            CallSignal::CallMade => "call-made",
            CallSignal::Ringing { .. } => "ringing",
            CallSignal::UserInCall => "user-in-call",
            CallSignal::UserNotInCall => "user-not-in-call",
        }
    }
}

/// Process-scoped pub/sub for [`CallSignal`]s.
#[derive(Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<CallSignal>,
}

impl SignalBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(SIGNAL_CAPACITY);
        Self { tx }
    }

    pub fn emit(&self, signal: CallSignal) {
        // No subscribers is not an error.
        let _ = self.tx.send(signal);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallSignal> {
        self.tx.subscribe()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}
