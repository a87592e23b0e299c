// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker session abstraction.
//!
//! A [`Connector`] opens one session ([`Link`]) to a broker described by a
//! [`BrokerTarget`]. Inbound traffic is handed back through a bounded channel
//! so it can be drained by a single consumer task, in arrival order.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::BrokerKind;
use crate::error::ProtocolError;

/// Capacity of the inbound message channel.
pub const INBOUND_CAPACITY: usize = 64;

/// Everything needed to open a session with one broker.
#[derive(Clone)]
pub struct BrokerTarget {
    /// Local device broker or cloud broker.
    pub kind: BrokerKind,
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// MQTT client id.
    pub client_id: String,
    /// MQTT user name.
    pub username: String,
    /// MQTT password.
    pub password: String,
    /// Whether to wrap the connection in TLS.
    pub tls: bool,
    /// MQTT keep-alive interval.
    pub keep_alive: Duration,
    /// How long to wait for the broker to accept the session.
    pub connect_timeout: Duration,
}

impl fmt::Debug for BrokerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerTarget")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

/// An event delivered by the transport to the consumer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A message published on a subscribed topic.
    Message {
        /// Topic the message arrived on.
        topic: String,
        /// UTF-8 payload.
        payload: String,
    },
    /// The transport dropped the session.
    Lost {
        /// Transport-reported reason.
        reason: String,
    },
}

/// Opens broker sessions.
pub trait Connector: Send + Sync + 'static {
    /// The session type this connector produces.
    type Link: Link;

    /// Opens a session and returns it with its inbound event stream.
    ///
    /// Resolves once the broker accepted the session, or with an error.
    fn connect(
        &self,
        target: &BrokerTarget,
    ) -> impl Future<Output = Result<(Self::Link, mpsc::Receiver<Inbound>), ProtocolError>> + Send;
}

/// An open broker session.
pub trait Link: Send + Sync + 'static {
    /// Publishes `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Subscribes to `topic`.
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Unsubscribes from `topic`.
    fn unsubscribe(&self, topic: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the session.
    fn disconnect(&self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Transport-reported connectivity.
    fn is_connected(&self) -> bool;
}
