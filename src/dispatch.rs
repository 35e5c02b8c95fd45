use crate::{
    config::CallsConfig,
    log_debug,
    models::{CallRecord, CallState, CallStateChange, CallType},
    signals::{CallSignal, SignalBus},
};

/// Fans classified events out to the signal bus and the configured observer.
#[derive(Clone, Default)]
pub struct Dispatcher {
    bus: SignalBus,
}

impl Dispatcher {
    pub fn new(bus: SignalBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Returns `None` for call types that carry no signal.
    pub fn call_event(&self, config: &CallsConfig, record: &CallRecord) -> Option<CallSignal> {
        let signal = match record.call_type {
            CallType::Incoming => CallSignal::CallAccepted,
            CallType::Missed => CallSignal::CallMissed,
            CallType::Outgoing => CallSignal::CallMade,
            CallType::Other(_) => return None,
        };

        log_debug!(config.debug, "{}", signal.name());

        if let Some(observer) = &config.observer {
            observer.on_call(record);
        }
        self.bus.emit(signal.clone());

        Some(signal)
    }

    pub fn state_event(
        &self,
        config: &CallsConfig,
        change: &CallStateChange,
    ) -> Option<CallSignal> {
        let number = change.number.as_deref();
        let signal = match change.state {
            CallState::Ringing => CallSignal::Ringing {
                number: change.number.clone(),
            },
            CallState::OffHook => CallSignal::UserInCall,
            CallState::Idle => CallSignal::UserNotInCall,
            CallState::Other(_) => return None,
        };

        log_debug!(config.debug, "{}", signal.name());

        self.bus.emit(signal.clone());
        if let Some(observer) = &config.observer {
            match change.state {
                CallState::Ringing => observer.on_ringing(number),
                CallState::OffHook => observer.on_busy(number),
                CallState::Idle => observer.on_free(number),
                CallState::Other(_) => {}
            }
        }

        Some(signal)
    }
}
