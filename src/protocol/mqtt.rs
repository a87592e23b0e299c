// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport backed by `rumqttc`.
//!
//! Each session spawns one task that drives the `rumqttc` event loop. Inbound
//! publishes are forwarded to the engine through a bounded channel, so the
//! engine consumes them on its own task and never from the network task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::transport::{BrokerTarget, Connector, INBOUND_CAPACITY, Inbound, Link};
use crate::error::ProtocolError;

/// Capacity of the `rumqttc` request channel.
const REQUEST_CAPACITY: usize = 10;

/// How long `disconnect` waits for the event loop to wind down.
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// Opens `rumqttc` sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MqttConnector;

impl MqttConnector {
    /// Creates a connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Connector for MqttConnector {
    type Link = MqttLink;

    async fn connect(
        &self,
        target: &BrokerTarget,
    ) -> Result<(MqttLink, mpsc::Receiver<Inbound>), ProtocolError> {
        if target.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let mut options = MqttOptions::new(&target.client_id, &target.host, target.port);
        options.set_keep_alive(target.keep_alive);
        options.set_clean_session(true);
        options.set_credentials(&target.username, &target.password);
        if target.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
        let (connack_tx, connack_rx) = oneshot::channel();

        let task = tokio::spawn(drive_event_loop(
            event_loop,
            Arc::clone(&connected),
            inbound_tx,
            connack_tx,
        ));

        let link = MqttLink {
            client,
            connected,
            task: Mutex::new(Some(task)),
        };

        match tokio::time::timeout(target.connect_timeout, connack_rx).await {
            Ok(Ok(Ok(()))) => {
                tracing::info!(
                    kind = %target.kind,
                    host = %target.host,
                    port = %target.port,
                    "Connected to MQTT broker"
                );
                Ok((link, inbound_rx))
            }
            Ok(Ok(Err(reason))) => Err(ProtocolError::ConnectionFailed(reason)),
            Ok(Err(_)) => Err(ProtocolError::ConnectionFailed(
                "MQTT event loop terminated unexpectedly".to_string(),
            )),
            Err(_) => {
                let millis = u64::try_from(target.connect_timeout.as_millis()).unwrap_or(u64::MAX);
                Err(ProtocolError::Timeout(millis))
            }
        }
    }
}

/// An open `rumqttc` session.
pub struct MqttLink {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Link for MqttLink {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), ProtocolError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ProtocolError::Mqtt)
    }

    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)
    }

    async fn unsubscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        self.client
            .unsubscribe(topic)
            .await
            .map_err(ProtocolError::Mqtt)
    }

    async fn disconnect(&self) -> Result<(), ProtocolError> {
        let was_connected = self.connected.swap(false, Ordering::AcqRel);
        let result = if was_connected {
            self.client.disconnect().await.map_err(ProtocolError::Mqtt)
        } else {
            Ok(())
        };

        let task = self.task.lock().take();
        if let Some(mut task) = task {
            // Give the event loop a chance to flush the DISCONNECT packet.
            if !was_connected
                || tokio::time::timeout(DISCONNECT_GRACE, &mut task)
                    .await
                    .is_err()
            {
                task.abort();
            }
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for MqttLink {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for MqttLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttLink")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Drives the `rumqttc` event loop until the session ends.
async fn drive_event_loop(
    mut event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    inbound: mpsc::Sender<Inbound>,
    connack: oneshot::Sender<Result<(), String>>,
) {
    let mut connack = Some(connack);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                tracing::debug!(?ack, "MQTT session accepted");
                connected.store(true, Ordering::Release);
                if let Some(tx) = connack.take() {
                    let _ = tx.send(Ok(()));
                }
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                tracing::debug!(?ack, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(payload) => {
                        tracing::trace!(topic = %publish.topic, "MQTT message received");
                        let message = Inbound::Message {
                            topic: publish.topic.clone(),
                            payload,
                        };
                        if inbound.send(message).await.is_err() {
                            tracing::debug!("Inbound consumer gone, stopping event loop");
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::warn!(topic = %publish.topic, "Dropping non UTF-8 payload");
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker closed the session");
                connected.store(false, Ordering::Release);
                let _ = inbound
                    .send(Inbound::Lost {
                        reason: "broker sent disconnect".to_string(),
                    })
                    .await;
                break;
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!("MQTT session closed locally");
                connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                let reason = e.to_string();
                if let Some(tx) = connack.take() {
                    let _ = tx.send(Err(reason));
                    break;
                }
                if connected.swap(false, Ordering::AcqRel) {
                    tracing::warn!(error = %reason, "MQTT session lost");
                    let _ = inbound.send(Inbound::Lost { reason }).await;
                }
                break;
            }
        }
    }
}
