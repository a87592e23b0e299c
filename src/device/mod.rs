// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device communication engine.
//!
//! A [`Device`] owns exactly one broker session at a time. It picks the broker
//! according to the configured
//! [`ConnectionMode`](crate::config::ConnectionMode), keeps the cached state fed
//! from inbound traffic, and publishes commands.
//!
//! # Connection Lifecycle
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──leg ok──► ConnectedLocal / ConnectedCloud
//!      ▲                           │                           │
//!      └────── all legs failed ────┘                           │
//!      └────────────── disconnect() / transport lost ──────────┘
//! ```
//!
//! The engine never reconnects on its own. After a transport loss the
//! connection listeners receive [`ConnectionStatus::Disconnected`] and the
//! host decides when to call [`Device::connect`] again.
//!
//! # Examples
//!
//! ```no_run
//! use ventlink_lib::config::{ConnectionMode, DeviceConnectionConfig, LocalCredential};
//! use ventlink_lib::types::FanSpeed;
//! use ventlink_lib::Device;
//!
//! # async fn example() -> ventlink_lib::Result<()> {
//! let config = DeviceConnectionConfig::builder("NK6-EU-MHA0000A", "438")
//!     .host("192.168.1.40")
//!     .local_credential(LocalCredential::password_hash("hash"))
//!     .mode(ConnectionMode::LocalOnly)
//!     .build()?;
//!
//! let device = Device::new(config);
//! let outcome = device.connect().await?;
//! if outcome.is_connected() {
//!     device.set_fan_speed(FanSpeed::new(6)?).await?;
//! }
//! device.disconnect().await;
//! # Ok(())
//! # }
//! ```

mod fan;
mod vacuum;

pub use vacuum::RobotVacuum;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::capabilities::{Capabilities, PowerControl, PowerControlDetector};
use crate::command::{Command, CommandDispatcher, RawCommand, Request};
use crate::config::{BrokerKind, DeviceCategory, DeviceConnectionConfig};
use crate::connection::{BrokerFailure, ConnectOutcome, ConnectionState, ConnectionStatus};
use crate::error::{Error, ProtocolError};
use crate::fault::FaultEntry;
use crate::heartbeat::{HeartbeatScheduler, HostReadiness};
use crate::protocol::{BrokerTarget, Connector, DeviceTopics, Inbound, Link, MqttConnector};
use crate::router::{MessageRouter, RouterStats};
use crate::state::{DeviceState, EnvironmentalData, StateStore};
use crate::subscription::{
    ConnectionListener, EnvironmentalListener, FaultListener, FirmwareListener, ListenerRegistry,
    StateListener,
};

/// State shared between the device and its background tasks.
struct Shared {
    store: Arc<StateStore>,
    listeners: Arc<ListenerRegistry>,
    detector: Arc<PowerControlDetector>,
    router: MessageRouter,
    state: RwLock<ConnectionState>,
    heartbeat: Mutex<HeartbeatScheduler>,
}

impl Shared {
    /// Moves to `next`, notifying connection listeners if the visible status
    /// changed.
    fn transition(&self, next: ConnectionState) {
        let previous = std::mem::replace(&mut *self.state.write(), next);
        let status = next.status();
        if previous.status() != status {
            tracing::debug!(from = ?previous, to = ?next, "Connection state changed");
            self.listeners.dispatch_connection(status);
        }
    }
}

struct Session<L> {
    link: Arc<L>,
    pump: JoinHandle<()>,
}

/// A connected appliance.
///
/// The type parameter selects the broker transport; it defaults to the
/// `rumqttc`-based [`MqttConnector`].
pub struct Device<C: Connector = MqttConnector> {
    config: DeviceConnectionConfig,
    connector: C,
    topics: DeviceTopics,
    readiness: HostReadiness,
    shared: Arc<Shared>,
    session: Mutex<Option<Session<C::Link>>>,
    dispatcher: RwLock<Option<CommandDispatcher<C::Link>>>,
    firmware_version: RwLock<Option<String>>,
}

impl Device<MqttConnector> {
    /// Creates an engine for `config` using the MQTT transport.
    #[must_use]
    pub fn new(config: DeviceConnectionConfig) -> Self {
        Self::with_connector(config, MqttConnector::new())
    }
}

impl<C: Connector> Device<C> {
    /// Creates an engine for `config` using `connector` to open sessions.
    #[must_use]
    pub fn with_connector(config: DeviceConnectionConfig, connector: C) -> Self {
        let topics = DeviceTopics::new(config.topic_prefix(), config.serial());
        let store = Arc::new(StateStore::new());
        let listeners = Arc::new(ListenerRegistry::new());
        let detector = Arc::new(PowerControlDetector::new());
        let router = MessageRouter::new(
            topics.clone(),
            Arc::clone(&store),
            Arc::clone(&listeners),
            Arc::clone(&detector),
        );

        Self {
            config,
            connector,
            topics,
            readiness: HostReadiness::ready(),
            shared: Arc::new(Shared {
                store,
                listeners,
                detector,
                router,
                state: RwLock::new(ConnectionState::Disconnected),
                heartbeat: Mutex::new(HeartbeatScheduler::new()),
            }),
            session: Mutex::new(None),
            dispatcher: RwLock::new(None),
            firmware_version: RwLock::new(None),
        }
    }

    /// Defers the heartbeat until `readiness` fires.
    #[must_use]
    pub fn with_host_readiness(mut self, readiness: HostReadiness) -> Self {
        self.readiness = readiness;
        self
    }

    // ========== Configuration ==========

    /// Returns the connection configuration.
    #[must_use]
    pub fn config(&self) -> &DeviceConnectionConfig {
        &self.config
    }

    /// Returns the device serial number.
    #[must_use]
    pub fn serial(&self) -> &str {
        self.config.serial()
    }

    /// Returns the device category.
    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        self.config.category()
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        self.config.capabilities()
    }

    /// Returns the topics this device uses.
    #[must_use]
    pub fn topics(&self) -> &DeviceTopics {
        &self.topics
    }

    // ========== Connection ==========

    /// Opens a session according to the configured connection mode.
    ///
    /// Each broker leg is tried in order under the configured timeout. A
    /// previous session and its heartbeat are torn down first. Failing every
    /// leg is not an error: the returned outcome reports `Disconnected` with
    /// one failure per leg.
    ///
    /// # Errors
    ///
    /// Returns an error if the encrypted local credential cannot be
    /// decrypted.
    pub async fn connect(&self) -> Result<ConnectOutcome, Error> {
        let local_password = match self.config.local_credential() {
            Some(credential) if self.config.mode().uses_local() => Some(credential.resolve()?),
            _ => None,
        };

        let mut session = self.session.lock().await;
        self.teardown(&mut session).await;
        self.shared.transition(ConnectionState::Connecting);
        self.shared.detector.reset();

        let mut failures = Vec::new();
        for &kind in self.config.mode().legs() {
            match self.open_leg(kind, local_password.as_deref()).await {
                Ok(opened) => {
                    let link = Arc::clone(&opened.link);
                    *session = Some(opened);
                    self.after_connect(kind, link).await;
                    return Ok(ConnectOutcome {
                        status: ConnectionState::connected_via(kind).status(),
                        failures,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        serial = %self.config.serial(),
                        broker = %kind,
                        error = %error,
                        "Broker connection failed"
                    );
                    failures.push(BrokerFailure { kind, error });
                }
            }
        }

        self.shared.transition(ConnectionState::Disconnected);
        Ok(ConnectOutcome {
            status: ConnectionStatus::Disconnected,
            failures,
        })
    }

    /// Closes the session and stops the heartbeat.
    ///
    /// Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        self.teardown(&mut session).await;
        self.shared.transition(ConnectionState::Disconnected);
    }

    /// Returns `true` if a session is up and the transport reports it alive.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.active_dispatcher().is_some()
    }

    /// Returns the internal lifecycle state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.state.read()
    }

    /// Returns the externally visible connection status.
    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        if self.is_connected() {
            self.connection_state().status()
        } else {
            ConnectionStatus::Disconnected
        }
    }

    fn target(
        &self,
        kind: BrokerKind,
        local_password: Option<&str>,
    ) -> Result<BrokerTarget, ProtocolError> {
        match kind {
            BrokerKind::Local => {
                let host = self.config.host().ok_or_else(|| {
                    ProtocolError::InvalidAddress("no local host configured".into())
                })?;
                Ok(BrokerTarget {
                    kind,
                    host: host.to_string(),
                    port: self.config.local_port(),
                    client_id: format!("ventlink-{}", Uuid::new_v4().simple()),
                    username: self.config.serial().to_string(),
                    password: local_password.unwrap_or_default().to_string(),
                    tls: false,
                    keep_alive: self.config.keep_alive(),
                    connect_timeout: self.config.connect_timeout(),
                })
            }
            BrokerKind::Cloud => {
                let (Some(endpoint), Some(credentials)) =
                    (self.config.cloud_endpoint(), self.config.cloud_credentials())
                else {
                    return Err(ProtocolError::MissingCloudEndpoint);
                };
                Ok(BrokerTarget {
                    kind,
                    host: endpoint.host.clone(),
                    port: endpoint.port,
                    client_id: credentials.client_id.clone(),
                    username: credentials.username.clone(),
                    password: credentials.password.clone(),
                    tls: true,
                    keep_alive: self.config.keep_alive(),
                    connect_timeout: self.config.connect_timeout(),
                })
            }
        }
    }

    async fn open_leg(
        &self,
        kind: BrokerKind,
        local_password: Option<&str>,
    ) -> Result<Session<C::Link>, ProtocolError> {
        let target = self.target(kind, local_password)?;
        let timeout = self.config.connect_timeout();

        let (link, inbound) = tokio::time::timeout(timeout, self.connector.connect(&target))
            .await
            .map_err(|_| {
                ProtocolError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            })??;
        let link = Arc::new(link);
        let pump = tokio::spawn(pump(Arc::clone(&self.shared), inbound));

        for topic in self.topics.subscriptions() {
            if let Err(e) = link.subscribe(topic).await {
                pump.abort();
                if let Err(close) = link.disconnect().await {
                    tracing::debug!(error = %close, "Closing half-open session failed");
                }
                return Err(e);
            }
        }

        tracing::info!(
            serial = %self.config.serial(),
            broker = %kind,
            host = %target.host,
            port = target.port,
            "Connected to broker"
        );
        Ok(Session { link, pump })
    }

    async fn after_connect(&self, kind: BrokerKind, link: Arc<C::Link>) {
        let dispatcher = CommandDispatcher::new(link, self.topics.command());
        *self.dispatcher.write() = Some(dispatcher.clone());
        self.shared.transition(ConnectionState::connected_via(kind));

        for request in Request::INITIAL {
            if let Err(e) = dispatcher.send(&request).await {
                tracing::warn!(request = request.as_str(), error = %e, "Initial request failed");
            }
        }

        if !dispatcher.is_connected() {
            return;
        }
        self.shared
            .heartbeat
            .lock()
            .await
            .start(dispatcher, Arc::clone(&self.shared.store), self.readiness.clone())
            .await;
    }

    async fn teardown(&self, slot: &mut Option<Session<C::Link>>) {
        self.shared.heartbeat.lock().await.stop().await;
        self.dispatcher.write().take();

        let Some(session) = slot.take() else {
            return;
        };
        session.pump.abort();
        if let Err(e) = session.pump.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, "Inbound task ended abnormally");
        }

        if session.link.is_connected() {
            for topic in self.topics.subscriptions() {
                if let Err(e) = session.link.unsubscribe(topic).await {
                    tracing::debug!(topic = %topic, error = %e, "Unsubscribe failed");
                }
            }
        }
        if let Err(e) = session.link.disconnect().await {
            tracing::debug!(error = %e, "Disconnect failed");
        }
        tracing::info!(serial = %self.config.serial(), "Session closed");
    }

    fn active_dispatcher(&self) -> Option<CommandDispatcher<C::Link>> {
        if !self.connection_state().status().is_connected() {
            return None;
        }
        self.dispatcher
            .read()
            .as_ref()
            .filter(|dispatcher| dispatcher.is_connected())
            .cloned()
    }

    // ========== Listeners ==========

    /// Registers a product-state listener. Returns `false` if already registered.
    pub fn add_state_listener(&self, listener: StateListener) -> bool {
        self.shared.listeners.state.add(listener)
    }

    /// Unregisters a product-state listener. Returns `false` if it was not registered.
    pub fn remove_state_listener(&self, listener: &StateListener) -> bool {
        self.shared.listeners.state.remove(listener)
    }

    /// Registers an environmental-data listener.
    pub fn add_environmental_listener(&self, listener: EnvironmentalListener) -> bool {
        self.shared.listeners.environmental.add(listener)
    }

    /// Unregisters an environmental-data listener.
    pub fn remove_environmental_listener(&self, listener: &EnvironmentalListener) -> bool {
        self.shared.listeners.environmental.remove(listener)
    }

    /// Registers a fault listener.
    pub fn add_fault_listener(&self, listener: FaultListener) -> bool {
        self.shared.listeners.faults.add(listener)
    }

    /// Unregisters a fault listener.
    pub fn remove_fault_listener(&self, listener: &FaultListener) -> bool {
        self.shared.listeners.faults.remove(listener)
    }

    /// Registers a firmware progress listener.
    pub fn add_firmware_listener(&self, listener: FirmwareListener) -> bool {
        self.shared.listeners.firmware.add(listener)
    }

    /// Unregisters a firmware progress listener.
    pub fn remove_firmware_listener(&self, listener: &FirmwareListener) -> bool {
        self.shared.listeners.firmware.remove(listener)
    }

    /// Registers a connection status listener.
    pub fn add_connection_listener(&self, listener: ConnectionListener) -> bool {
        self.shared.listeners.connection.add(listener)
    }

    /// Unregisters a connection status listener.
    pub fn remove_connection_listener(&self, listener: &ConnectionListener) -> bool {
        self.shared.listeners.connection.remove(listener)
    }

    // ========== Cached State ==========

    /// Returns a copy of the last known product state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        self.shared.store.snapshot()
    }

    /// Returns a copy of the last environmental readings.
    #[must_use]
    pub fn environmental(&self) -> EnvironmentalData {
        self.shared.store.environmental()
    }

    /// Returns the active faults.
    ///
    /// Faults from the fault topic come first, followed by those derived from
    /// the `ercd`/`wacd` state codes that the fault topic did not report.
    #[must_use]
    pub fn faults(&self) -> Vec<FaultEntry> {
        self.shared.store.active_faults()
    }

    /// Returns the inferred power-control scheme.
    #[must_use]
    pub fn power_control(&self) -> PowerControl {
        self.shared.detector.scheme()
    }

    /// Returns the power-control detector of the current session.
    #[must_use]
    pub fn power_control_detector(&self) -> &PowerControlDetector {
        &self.shared.detector
    }

    /// Returns the router counters.
    #[must_use]
    pub fn diagnostics(&self) -> RouterStats {
        self.shared.router.stats()
    }

    /// Records the firmware version reported by the account layer.
    pub fn set_firmware_version(&self, version: impl Into<String>) {
        *self.firmware_version.write() = Some(version.into());
    }

    /// Returns the recorded firmware version.
    #[must_use]
    pub fn firmware_version(&self) -> Option<String> {
        self.firmware_version.read().clone()
    }

    // ========== Commands ==========

    /// Publishes a command with discriminator `msg` and optional `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] without publishing if no session is
    /// active, or a protocol error if the publish fails.
    pub async fn send_command(
        &self,
        msg: &str,
        data: Option<Map<String, Value>>,
    ) -> Result<(), Error> {
        self.send(&RawCommand::new(msg, data)).await
    }

    /// Asks the device for its full state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn request_current_state(&self) -> Result<(), Error> {
        self.send(&Request::CurrentState).await
    }

    /// Asks the device for fresh sensor readings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn request_environmental_data(&self) -> Result<(), Error> {
        self.send(&Request::EnvironmentalData).await
    }

    /// Asks the device for its active faults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn request_current_faults(&self) -> Result<(), Error> {
        self.send(&Request::CurrentFaults).await
    }

    pub(crate) async fn send<T: Command + Sync>(&self, command: &T) -> Result<(), Error> {
        let dispatcher = self.active_dispatcher().ok_or(Error::NotConnected)?;
        dispatcher.send(command).await
    }

    pub(crate) fn check_capability(&self, capability: &str, supported: bool) -> Result<(), Error> {
        if supported {
            Ok(())
        } else {
            Err(Error::CapabilityNotSupported {
                capability: capability.to_string(),
            })
        }
    }
}

impl<C: Connector> fmt::Debug for Device<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("serial", &self.config.serial())
            .field("mode", &self.config.mode())
            .field("state", &self.connection_state())
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Drop for Device<C> {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.pump.abort();
        }
    }
}

/// Drains the inbound channel of one session, in arrival order.
async fn pump(shared: Arc<Shared>, mut inbound: mpsc::Receiver<Inbound>) {
    let reason = loop {
        match inbound.recv().await {
            Some(Inbound::Message { topic, payload }) => shared.router.route(&topic, &payload),
            Some(Inbound::Lost { reason }) => break reason,
            None => break "inbound channel closed".to_string(),
        }
    };

    tracing::warn!(reason = %reason, "Broker session lost");
    shared.heartbeat.lock().await.stop().await;
    shared.transition(ConnectionState::Disconnected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionMode, LocalCredential};

    #[tokio::test]
    async fn disconnected_device_rejects_commands() {
        let config = DeviceConnectionConfig::builder("SN1", "438")
            .host("127.0.0.1")
            .local_credential(LocalCredential::password_hash("hash"))
            .mode(ConnectionMode::LocalOnly)
            .build()
            .unwrap();
        let device = Device::new(config);

        assert!(!device.is_connected());
        assert_eq!(device.connection_status(), ConnectionStatus::Disconnected);
        assert!(matches!(
            device.request_current_state().await,
            Err(Error::NotConnected)
        ));
        device.disconnect().await;
        device.disconnect().await;
        assert_eq!(device.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn missing_capability_is_reported() {
        let config = DeviceConnectionConfig::builder("SN1", "438")
            .host("127.0.0.1")
            .local_credential(LocalCredential::password_hash("hash"))
            .mode(ConnectionMode::LocalOnly)
            .build()
            .unwrap();
        let device = Device::new(config);
        let err = device.check_capability("Heating", false).unwrap_err();
        assert!(matches!(err, Error::CapabilityNotSupported { .. }));
    }
}
