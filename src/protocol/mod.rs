// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol and broker transport.
//!
//! - [`Connector`] / [`Link`]: the broker session seam, implemented over
//!   `rumqttc` by [`MqttConnector`]
//! - [`DeviceTopics`]: the per-device topic layout
//! - [`Envelope`] / [`InboundMessage`]: the JSON message envelope

mod envelope;
mod mqtt;
mod topics;
mod transport;

pub use envelope::{
    CURRENT_FAULTS, CURRENT_STATE, ENVIRONMENTAL_DATA, Envelope, InboundMessage, STATE_CHANGE,
    format_timestamp,
};
pub use mqtt::{MqttConnector, MqttLink};
pub use topics::{DeviceTopics, TopicKind};
pub use transport::{BrokerTarget, Connector, INBOUND_CAPACITY, Inbound, Link};
