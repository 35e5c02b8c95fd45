use log::info;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ConfigHandle,
    dispatch::Dispatcher,
    models::CallStateChange,
    signals::CallSignal,
};

/// Turns telephony state transitions into ringing / busy / free signals.
///
/// Each transition is handled on its own; repeated identical states are
/// passed through as-is.
pub struct CallStateWatcher {
    config: ConfigHandle,
    dispatcher: Dispatcher,
}

impl CallStateWatcher {
    pub fn new(config: ConfigHandle, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    pub fn on_transition(&self, change: &CallStateChange) -> Option<CallSignal> {
        let config = self.config.snapshot();
        self.dispatcher.state_event(&config, change)
    }

    pub async fn run(
        self,
        mut transitions: mpsc::UnboundedReceiver<CallStateChange>,
        cancel_token: CancellationToken,
    ) {
        loop {
            tokio::select! {
                change = transitions.recv() => {
                    let Some(change) = change else {
                        info!("telephony source closed; watcher exiting");
                        break;
                    };
                    self.on_transition(&change);
                }
                _ = cancel_token.cancelled() => {
                    break;
                }
            }
        }
    }
}
