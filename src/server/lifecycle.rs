//! Listener lifecycle controller
//!
//! `ListenerService` is the single owner of the listener state. Every
//! transition (start, stop, restart, configuration change) runs under one
//! lock, so configuration events are applied one at a time, in the order they
//! are delivered, and no caller can observe a half-finished port change.
//!
//! The "enabled" indicator is published on a watch channel so UI code can
//! mirror it; a failed start always republishes `false`.

use std::net::SocketAddr;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::ListenerConfig;
use crate::error::BindError;
use crate::gateway::UiDispatcher;

use super::listener::{spawn_listener, ListenerHandle};

/// Process-visible state of the listener
pub enum ListenerState {
    Stopped,
    Running { port: u16, handle: ListenerHandle },
}

impl ListenerState {
    fn is_running(&self) -> bool {
        matches!(self, ListenerState::Running { .. })
    }
}

/// A single configuration-change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    Enabled(bool),
    Port(u16),
}

struct ServiceInner {
    config: ListenerConfig,
    state: ListenerState,
}

/// Starts and stops the command listener in response to configuration
pub struct ListenerService {
    inner: Mutex<ServiceInner>,
    dispatcher: UiDispatcher,
    enabled_tx: watch::Sender<bool>,
}

impl ListenerService {
    /// Create a stopped service. Call [`activate`](Self::activate) to honour
    /// `config.enabled`.
    pub fn new(config: ListenerConfig, dispatcher: UiDispatcher) -> Self {
        let (enabled_tx, _) = watch::channel(false);
        Self {
            inner: Mutex::new(ServiceInner {
                config,
                state: ListenerState::Stopped,
            }),
            dispatcher,
            enabled_tx,
        }
    }

    /// Start the listener if the configuration asks for it.
    ///
    /// On failure `enabled` is reverted to false.
    pub fn activate(&self) -> Result<(), BindError> {
        let mut inner = self.inner.lock();
        if !inner.config.enabled {
            self.publish(&inner);
            return Ok(());
        }
        self.start_or_revert(&mut inner)
    }

    /// Bind and start accepting. A no-op if already running.
    pub fn start(&self) -> Result<(), BindError> {
        let mut inner = self.inner.lock();
        let result = Self::start_locked(&mut inner, &self.dispatcher);
        self.publish(&inner);
        result
    }

    /// Stop accepting and release the socket. A no-op if already stopped.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        Self::stop_locked(&mut inner);
        self.publish(&inner);
    }

    /// Stop, switch to `new_port`, and start again, as one step.
    pub fn restart(&self, new_port: u16) -> Result<(), BindError> {
        let mut inner = self.inner.lock();
        let result = Self::restart_locked(&mut inner, &self.dispatcher, new_port);
        self.publish(&inner);
        result
    }

    /// Apply one configuration change.
    ///
    /// A bind failure while enabling or changing port reverts `enabled` to
    /// false and is returned for reporting.
    pub fn apply(&self, change: ConfigChange) -> Result<(), BindError> {
        let mut inner = self.inner.lock();
        self.apply_locked(&mut inner, change)
    }

    /// Apply the difference between the current configuration and `new`.
    ///
    /// When disabling, the stop happens before any port change, so the old
    /// listener is never restarted pointlessly; when enabling, the port is
    /// updated first so only the new port is ever bound.
    pub fn on_config_changed(&self, new: &ListenerConfig) -> Result<(), BindError> {
        let mut inner = self.inner.lock();
        let current = inner.config;

        let mut changes = Vec::with_capacity(2);
        let enabled_change =
            (current.enabled != new.enabled).then_some(ConfigChange::Enabled(new.enabled));
        let port_change = (current.port != new.port).then_some(ConfigChange::Port(new.port));
        if new.enabled {
            changes.extend(port_change);
            changes.extend(enabled_change);
        } else {
            changes.extend(enabled_change);
            changes.extend(port_change);
        }

        for change in changes {
            self.apply_locked(&mut inner, change)?;
        }
        Ok(())
    }

    /// Flip `enabled` and return the resulting state.
    pub fn toggle(&self) -> Result<bool, BindError> {
        let mut inner = self.inner.lock();
        let target = !inner.config.enabled;
        self.apply_locked(&mut inner, ConfigChange::Enabled(target))?;
        Ok(inner.config.enabled)
    }

    /// Whether a listener is currently bound
    pub fn is_running(&self) -> bool {
        self.inner.lock().state.is_running()
    }

    /// Address of the running listener
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.inner.lock().state {
            ListenerState::Running { handle, .. } => Some(handle.local_addr()),
            ListenerState::Stopped => None,
        }
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> ListenerConfig {
        self.inner.lock().config
    }

    /// Subscribe to the "enabled" indicator
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.enabled_tx.subscribe()
    }

    fn apply_locked(
        &self,
        inner: &mut ServiceInner,
        change: ConfigChange,
    ) -> Result<(), BindError> {
        match change {
            ConfigChange::Enabled(true) => {
                inner.config.enabled = true;
                self.start_or_revert(inner)
            }
            ConfigChange::Enabled(false) => {
                inner.config.enabled = false;
                Self::stop_locked(inner);
                self.publish(inner);
                Ok(())
            }
            ConfigChange::Port(port) if port == inner.config.port => Ok(()),
            ConfigChange::Port(port) if inner.state.is_running() => {
                let result = Self::restart_locked(inner, &self.dispatcher, port);
                self.settle(inner, result)
            }
            ConfigChange::Port(port) => {
                inner.config.port = port;
                Ok(())
            }
        }
    }

    fn start_or_revert(&self, inner: &mut ServiceInner) -> Result<(), BindError> {
        let result = Self::start_locked(inner, &self.dispatcher);
        self.settle(inner, result)
    }

    /// Revert `enabled` if a start failed, then publish the indicator.
    fn settle(
        &self,
        inner: &mut ServiceInner,
        result: Result<(), BindError>,
    ) -> Result<(), BindError> {
        if let Err(e) = &result {
            tracing::warn!("Unable to start steb listener. ({})", e);
            inner.config.enabled = false;
        }
        self.publish(inner);
        result
    }

    fn restart_locked(
        inner: &mut ServiceInner,
        dispatcher: &UiDispatcher,
        new_port: u16,
    ) -> Result<(), BindError> {
        Self::stop_locked(inner);
        inner.config.port = new_port;
        Self::start_locked(inner, dispatcher)
    }

    fn start_locked(inner: &mut ServiceInner, dispatcher: &UiDispatcher) -> Result<(), BindError> {
        if inner.state.is_running() {
            return Ok(());
        }
        let port = inner.config.port;
        let handle = spawn_listener(port, dispatcher.clone())?;
        inner.state = ListenerState::Running { port, handle };
        Ok(())
    }

    fn stop_locked(inner: &mut ServiceInner) {
        if let ListenerState::Running { port, handle } =
            std::mem::replace(&mut inner.state, ListenerState::Stopped)
        {
            tracing::info!("Stopping listener on port {}", port);
            handle.shutdown();
        }
    }

    fn publish(&self, inner: &ServiceInner) {
        self.enabled_tx.send_replace(inner.state.is_running());
    }
}

impl Drop for ListenerService {
    fn drop(&mut self) {
        Self::stop_locked(self.inner.get_mut());
    }
}
