use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{error, warn};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    config::{CallsConfig, ConfigHandle},
    db::{Database, EngineOpener, SensorEngine},
    dispatch::Dispatcher,
    log_debug,
    models::CallStateChange,
    platform::{missing_permissions, Permission, Platform},
    signals::{CallSignal, SignalBus},
    watchers::{CallLogWatcher, CallStateWatcher},
};

use super::{Command, SensorStatus, StartMode, SyncBridge};

/// Running watcher tasks. Dropping this cancels them.
struct ActiveWatchers {
    _cancel_guard: DropGuard,
    cancel_token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ActiveWatchers {
    fn new(cancel_token: CancellationToken, handles: Vec<JoinHandle<()>>) -> Self {
        Self {
            _cancel_guard: cancel_token.clone().drop_guard(),
            cancel_token,
            handles,
        }
    }
}

#[derive(Default)]
struct SensorInner {
    status: SensorStatus,
    engine: Option<Arc<dyn SensorEngine>>,
    watchers: Option<ActiveWatchers>,
}

impl Drop for SensorInner {
    fn drop(&mut self) {
        // Cancels the watcher tasks; their registrations go with them.
        self.watchers.take();

        let Some(engine) = self.engine.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(err) = engine.close().await {
                        error!("Failed to close storage engine of dropped sensor: {err:?}");
                    }
                });
            }
            Err(_) => warn!("Active sensor dropped outside a runtime; storage engine not closed"),
        }
    }
}

/// Owns the call watchers and routes their events.
///
/// Commands are accepted in every state. Watchers and the storage engine only
/// exist while the sensor is active.
pub struct CallsSensor {
    platform: Platform,
    config: ConfigHandle,
    dispatcher: Dispatcher,
    open_engine: EngineOpener,
    inner: Mutex<SensorInner>,
}

impl CallsSensor {
    pub fn new(platform: Platform, config: CallsConfig, open_engine: EngineOpener) -> Self {
        Self {
            platform,
            config: ConfigHandle::new(config),
            dispatcher: Dispatcher::new(SignalBus::new()),
            open_engine,
            inner: Mutex::new(SensorInner::default()),
        }
    }

    /// Sensor that stores records in the SQLite file named by `config.db_path`.
    pub fn with_database(platform: Platform, config: CallsConfig) -> Self {
        Self::new(platform, config, Database::opener())
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallSignal> {
        self.dispatcher.bus().subscribe()
    }

    pub async fn status(&self) -> SensorStatus {
        self.inner.lock().await.status
    }

    /// Activates both watchers, merging `config` over the current one first.
    ///
    /// Returns `NotSticky` without registering anything when a required
    /// permission is missing.
    pub async fn start(&self, config: Option<CallsConfig>) -> Result<StartMode> {
        if let Some(config) = config {
            self.config.replace_with(config);
        }

        let mut inner = self.inner.lock().await;
        if inner.status == SensorStatus::Active {
            return Ok(StartMode::Sticky);
        }

        let missing = missing_permissions(self.platform.permissions.as_ref());
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(Permission::as_str).collect();
            warn!("Missing permissions detected: {}", names.join(", "));
            return Ok(StartMode::NotSticky);
        }

        let snapshot = self.config.snapshot();
        let engine = {
            let open_engine = Arc::clone(&self.open_engine);
            let config = snapshot.clone();
            tokio::task::spawn_blocking(move || open_engine(&config))
                .await
                .context("storage engine open worker join failed")?
                .context("failed to open storage engine")?
        };

        let (changes, transitions) = match self.register_sources() {
            Ok(registrations) => registrations,
            Err(err) => {
                if let Err(close_err) = engine.close().await {
                    error!("Failed to close engine after registration error: {close_err:?}");
                }
                return Err(err);
            }
        };

        let cancel_token = CancellationToken::new();
        let log_watcher = CallLogWatcher::new(
            Arc::clone(&self.platform.call_log),
            Arc::clone(&engine),
            self.config.clone(),
            self.dispatcher.clone(),
        );
        let state_watcher = CallStateWatcher::new(self.config.clone(), self.dispatcher.clone());

        let handles = vec![
            tokio::spawn(log_watcher.run(changes, cancel_token.clone())),
            tokio::spawn(state_watcher.run(transitions, cancel_token.clone())),
        ];

        inner.engine = Some(engine);
        inner.watchers = Some(ActiveWatchers::new(cancel_token, handles));
        inner.status = SensorStatus::Active;

        log_debug!(snapshot.debug, "Calls service is active.");

        Ok(StartMode::Sticky)
    }

    fn register_sources(
        &self,
    ) -> Result<(
        mpsc::UnboundedReceiver<()>,
        mpsc::UnboundedReceiver<CallStateChange>,
    )> {
        let changes = self
            .platform
            .call_log
            .register()
            .context("failed to register call log observer")?;
        let transitions = self
            .platform
            .telephony
            .listen()
            .context("failed to listen for call state")?;
        Ok((changes, transitions))
    }

    /// Unregisters both watchers and closes the storage engine.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.status != SensorStatus::Active {
            return Ok(());
        }
        inner.status = SensorStatus::Stopped;

        if let Some(mut watchers) = inner.watchers.take() {
            watchers.cancel_token.cancel();
            for handle in std::mem::take(&mut watchers.handles) {
                if let Err(err) = handle.await {
                    error!("Watcher task failed to join: {err}");
                }
            }
        }

        if let Some(engine) = inner.engine.take() {
            engine
                .close()
                .await
                .context("failed to close storage engine")?;
        }

        log_debug!(self.config.snapshot().debug, "Calls service terminated.");

        Ok(())
    }

    /// Requests a sync of the calls table. Ignored while the sensor is inactive.
    pub async fn sync(&self) -> Result<()> {
        let engine = self.inner.lock().await.engine.clone();
        match engine {
            Some(engine) => SyncBridge::new(engine).sync().await,
            None => {
                log_debug!(
                    self.config.snapshot().debug,
                    "Sync requested while inactive; ignored"
                );
                Ok(())
            }
        }
    }

    /// Applies one command.
    ///
    /// Start requests report how activation went; `NotSticky` tells the host
    /// not to restart the sensor on its own. Other commands report `None`.
    pub async fn handle_command(&self, command: Command) -> Result<Option<StartMode>> {
        let config = self.config.snapshot();
        log_debug!(config.debug, "Sensor command received: {}", command.name());

        match command {
            Command::Start => return self.start(None).await.map(Some),
            Command::StartEnabled => {
                log_debug!(config.debug, "Sensor enabled: {}", config.enabled);
                if config.enabled {
                    return self.start(None).await.map(Some);
                }
            }
            Command::Stop | Command::StopAll => self.stop().await?,
            Command::SetLabel { label } => self.config.set_label(label),
            Command::Sync => self.sync().await?,
        }

        Ok(None)
    }

    /// Spawns a command loop on the current runtime and returns its sender.
    ///
    /// The loop ends when every sender is dropped. Failed commands and refused
    /// starts are logged.
    pub fn command_channel(self: &Arc<Self>) -> mpsc::UnboundedSender<Command> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        let sensor = Arc::clone(self);

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let name = command.name();
                match sensor.handle_command(command).await {
                    Ok(Some(StartMode::NotSticky)) => {
                        warn!("Sensor command {name} refused; not restarting automatically")
                    }
                    Ok(_) => {}
                    Err(err) => error!("Sensor command {name} failed: {err:?}"),
                }
            }
        });

        tx
    }

    /// Sends a command through `tx`, mapping a closed loop to an error.
    pub fn send_command(tx: &mpsc::UnboundedSender<Command>, command: Command) -> Result<()> {
        tx.send(command)
            .map_err(|err| anyhow!("sensor command loop closed: {}", err.0.name()))
    }
}
