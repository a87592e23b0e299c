// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `VentLink` Lib - A Rust library to talk to connected air-treatment appliances.
//!
//! This library provides an async, per-device communication engine for purifier
//! fans, heaters, humidifiers and robot vacuums that speak JSON over MQTT, either
//! through the appliance's own broker or through the vendor cloud broker.
//!
//! # Supported Features
//!
//! - **Connection management**: local, cloud, or ordered fallback between both
//! - **Cached state**: full states and deltas merged into one consistent snapshot
//! - **Typed accessors**: fan, heater, humidifier, environmental and robot readings
//! - **Commands**: power, speed, oscillation, timers, climate targets, filters,
//!   firmware upgrades and robot actions
//! - **Heartbeat**: periodic refresh when the device stays quiet
//! - **Faults**: normalized, OK-filtered fault lists with descriptions
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ventlink_lib::config::{
//!     CloudCredentials, CloudEndpoint, ConnectionMode, DeviceConnectionConfig, LocalCredential,
//! };
//! use ventlink_lib::state::{DeviceState, FanState};
//! use ventlink_lib::types::FanSpeed;
//! use ventlink_lib::Device;
//!
//! #[tokio::main]
//! async fn main() -> ventlink_lib::Result<()> {
//!     let config = DeviceConnectionConfig::builder("NK6-EU-MHA0000A", "438")
//!         .host("192.168.1.40")
//!         .local_credential(LocalCredential::password_hash("c2VjcmV0"))
//!         .mode(ConnectionMode::LocalThenCloud)
//!         .cloud(
//!             CloudEndpoint::new("iot.example.com"),
//!             CloudCredentials {
//!                 client_id: "client".into(),
//!                 username: "user".into(),
//!                 password: "token".into(),
//!             },
//!         )
//!         .build()?;
//!
//!     let device = Device::new(config);
//!     device.add_state_listener(Arc::new(|state: &DeviceState| {
//!         println!("fan speed: {:?}", state.fan_speed());
//!     }));
//!
//!     let outcome = device.connect().await?;
//!     println!("connected via {}", outcome.status);
//!
//!     device.set_fan_speed(FanSpeed::new(4)?).await?;
//!     device.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Custom Transports
//!
//! [`Device`] is generic over a [`protocol::Connector`]. The default is the
//! `rumqttc`-based [`protocol::MqttConnector`]; tests and embedders can supply
//! their own with [`Device::with_connector`].

pub mod capabilities;
pub mod command;
pub mod config;
pub mod connection;
pub mod credentials;
mod device;
pub mod error;
pub mod fault;
pub mod firmware;
pub mod heartbeat;
pub mod protocol;
pub mod router;
pub mod state;
pub mod subscription;
pub mod types;

pub use capabilities::{Capabilities, Capability, PowerControl, PowerControlDetector};
pub use command::Command;
pub use config::{ConnectionMode, DeviceCategory, DeviceConnectionConfig};
pub use connection::{ConnectOutcome, ConnectionState, ConnectionStatus};
pub use device::{Device, RobotVacuum};
pub use error::{CredentialError, Error, ParseError, ProtocolError, Result, ValueError};
pub use fault::FaultEntry;
pub use firmware::FirmwareStatus;
pub use heartbeat::HostReadiness;
pub use router::RouterStats;
pub use state::{DeviceState, EnvironmentalData};
pub use types::{FanSpeed, PowerState};
