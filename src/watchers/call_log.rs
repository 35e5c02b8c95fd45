use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ConfigHandle,
    db::SensorEngine,
    dispatch::Dispatcher,
    models::CallRecord,
    platform::CallLogSource,
};

/// Turns call-log change notifications into stored [`CallRecord`]s.
pub struct CallLogWatcher {
    source: Arc<dyn CallLogSource>,
    engine: Arc<dyn SensorEngine>,
    config: ConfigHandle,
    dispatcher: Dispatcher,
}

impl CallLogWatcher {
    pub fn new(
        source: Arc<dyn CallLogSource>,
        engine: Arc<dyn SensorEngine>,
        config: ConfigHandle,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            source,
            engine,
            config,
            dispatcher,
        }
    }

    /// Handles one change notification.
    ///
    /// Returns the captured record, or `None` when the call log is empty.
    /// A failed save is logged and the record is still dispatched.
    pub async fn on_change(&self) -> Result<Option<CallRecord>> {
        let source = Arc::clone(&self.source);
        let row = tokio::task::spawn_blocking(move || source.latest_call())
            .await
            .context("call log query worker join failed")?
            .context("call log query failed")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let config = self.config.snapshot();
        let record = CallRecord::capture(row, &config, Utc::now().timestamp_millis());

        if let Err(err) = self.engine.save(&record, CallRecord::TABLE_NAME).await {
            warn!("failed to persist call record: {err:?}");
        }

        self.dispatcher.call_event(&config, &record);

        Ok(Some(record))
    }

    pub async fn run(
        self,
        mut changes: mpsc::UnboundedReceiver<()>,
        cancel_token: CancellationToken,
    ) {
        loop {
            tokio::select! {
                change = changes.recv() => {
                    if change.is_none() {
                        info!("call log source closed; watcher exiting");
                        break;
                    }
                    if let Err(err) = self.on_change().await {
                        warn!("call log change skipped: {err:?}");
                    }
                }
                _ = cancel_token.cancelled() => {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CallsConfig;
    use crate::models::{CallLogRow, CallType};
    use crate::platform::MemoryCallLog;
    use crate::signals::CallSignal;
    use crate::test_support::{
        FailingEngine, FlakyCallLog, MemoryEngine, ObserverEvent, RecordingObserver,
    };
    use std::time::Duration;
    use tokio::time::timeout;

    fn row(call_type: CallType, date: i64) -> CallLogRow {
        CallLogRow {
            call_type,
            date,
            duration: 42,
            number: Some("555-1234".into()),
        }
    }

    fn default_config() -> ConfigHandle {
        ConfigHandle::new(CallsConfig::default())
    }

    fn watcher(
        source: Arc<dyn CallLogSource>,
        engine: Arc<dyn SensorEngine>,
        config: &ConfigHandle,
        dispatcher: &Dispatcher,
    ) -> CallLogWatcher {
        CallLogWatcher::new(source, engine, config.clone(), dispatcher.clone())
    }

    #[tokio::test]
    async fn empty_log_produces_nothing() {
        let log = Arc::new(MemoryCallLog::new());
        let engine = Arc::new(MemoryEngine::default());
        let dispatcher = Dispatcher::default();
        let mut signals = dispatcher.bus().subscribe();
        let watcher = watcher(log, engine.clone(), &default_config(), &dispatcher);

        assert_eq!(watcher.on_change().await.unwrap(), None);
        assert!(engine.saved().is_empty());
        assert!(signals.try_recv().is_err());
    }

    #[tokio::test]
    async fn incoming_call_is_saved_and_signalled() {
        let log = Arc::new(MemoryCallLog::new());
        log.insert(row(CallType::Incoming, 1000));
        let engine = Arc::new(MemoryEngine::default());
        let observer = Arc::new(RecordingObserver::default());
        let config = ConfigHandle::new(CallsConfig {
            device_id: "d1".into(),
            label: "home".into(),
            observer: Some(observer.clone()),
            ..CallsConfig::default()
        });
        let dispatcher = Dispatcher::default();
        let mut signals = dispatcher.bus().subscribe();

        let record = watcher(log, engine.clone(), &config, &dispatcher)
            .on_change()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.device_id, "d1");
        assert_eq!(record.label, "home");
        assert_eq!(record.event_timestamp, 1000);
        assert_eq!(record.duration, 42);
        assert_eq!(record.trace.as_deref(), Some("555-1234"));
        assert_eq!(record.call_type, CallType::Incoming);
        assert_eq!(
            engine.saved(),
            vec![(CallRecord::TABLE_NAME.to_string(), record.clone())]
        );
        assert_eq!(signals.try_recv().unwrap(), CallSignal::CallAccepted);
        assert_eq!(observer.events(), vec![ObserverEvent::Call(record)]);
    }

    #[tokio::test]
    async fn unknown_type_is_saved_without_signal() {
        let log = Arc::new(MemoryCallLog::new());
        log.insert(row(CallType::Other(4), 1000));
        let engine = Arc::new(MemoryEngine::default());
        let dispatcher = Dispatcher::default();
        let mut signals = dispatcher.bus().subscribe();

        watcher(log, engine.clone(), &default_config(), &dispatcher)
            .on_change()
            .await
            .unwrap();

        assert_eq!(engine.saved().len(), 1);
        assert!(signals.try_recv().is_err());
    }

    #[tokio::test]
    async fn label_change_applies_to_later_records_only() {
        let log = Arc::new(MemoryCallLog::new());
        let engine = Arc::new(MemoryEngine::default());
        let config = ConfigHandle::new(CallsConfig {
            label: "home".into(),
            ..CallsConfig::default()
        });
        let watcher = watcher(log.clone(), engine.clone(), &config, &Dispatcher::default());

        log.insert(row(CallType::Outgoing, 1000));
        watcher.on_change().await.unwrap();
        config.set_label("work");
        log.insert(row(CallType::Missed, 2000));
        watcher.on_change().await.unwrap();

        let labels: Vec<_> = engine.saved().into_iter().map(|(_, r)| r.label).collect();
        assert_eq!(labels, vec!["home", "work"]);
    }

    #[tokio::test]
    async fn every_notification_yields_a_record() {
        let log = Arc::new(MemoryCallLog::new());
        log.insert(row(CallType::Outgoing, 1000));
        let engine = Arc::new(MemoryEngine::default());
        let watcher = watcher(log, engine.clone(), &default_config(), &Dispatcher::default());

        watcher.on_change().await.unwrap();
        watcher.on_change().await.unwrap();

        assert_eq!(engine.saved().len(), 2);
    }

    #[tokio::test]
    async fn failed_save_still_dispatches() {
        let log = Arc::new(MemoryCallLog::new());
        log.insert(row(CallType::Missed, 1000));
        let dispatcher = Dispatcher::default();
        let mut signals = dispatcher.bus().subscribe();

        let record = watcher(log, Arc::new(FailingEngine), &default_config(), &dispatcher)
            .on_change()
            .await
            .unwrap();

        assert!(record.is_some());
        assert_eq!(signals.try_recv().unwrap(), CallSignal::CallMissed);
    }

    #[tokio::test]
    async fn failed_query_skips_one_cycle_and_keeps_running() {
        let log = Arc::new(FlakyCallLog::failing_once());
        let changes = log.register().unwrap();
        let engine = Arc::new(MemoryEngine::default());
        let dispatcher = Dispatcher::default();
        let mut signals = dispatcher.bus().subscribe();
        let cancel_token = CancellationToken::new();
        let watcher = watcher(log.clone(), engine.clone(), &default_config(), &dispatcher);
        let handle = tokio::spawn(watcher.run(changes, cancel_token.clone()));

        log.insert(row(CallType::Incoming, 1000));
        log.insert(row(CallType::Outgoing, 2000));

        let signal = timeout(Duration::from_secs(5), signals.recv())
            .await
            .expect("signal timed out")
            .unwrap();
        cancel_token.cancel();
        handle.await.unwrap();

        assert_eq!(signal, CallSignal::CallMade);
        let saved = engine.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1.event_timestamp, 2000);
        assert!(signals.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let log = Arc::new(MemoryCallLog::new());
        let changes = log.register().unwrap();
        let cancel_token = CancellationToken::new();
        let engine = Arc::new(MemoryEngine::default());
        let watcher = watcher(log.clone(), engine, &default_config(), &Dispatcher::default());

        let handle = tokio::spawn(watcher.run(changes, cancel_token.clone()));
        cancel_token.cancel();
        handle.await.unwrap();

        assert_eq!(log.observer_count(), 0);
    }
}
