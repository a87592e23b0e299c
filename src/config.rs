// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection configuration for a single device.
//!
//! A [`DeviceConnectionConfig`] is produced once by the setup layer and owned by
//! exactly one [`Device`](crate::Device) for its whole lifetime.
//!
//! # Examples
//!
//! ```
//! use ventlink_lib::config::{ConnectionMode, DeviceConnectionConfig, LocalCredential};
//!
//! let config = DeviceConnectionConfig::builder("NK6-EU-MHA0000A", "438")
//!     .host("192.168.1.42")
//!     .local_credential(LocalCredential::password_hash("aGFzaA=="))
//!     .mode(ConnectionMode::LocalOnly)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.topic_prefix(), "438");
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::{CredentialError, Error, ValueError};

/// Standard MQTT port of the broker embedded in the device.
pub const DEFAULT_LOCAL_PORT: u16 = 1883;

/// TLS MQTT port of the cloud IoT broker.
pub const DEFAULT_CLOUD_PORT: u16 = 8883;

/// Which brokers to try, and in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionMode {
    /// Local broker only.
    LocalOnly,
    /// Local broker, falling back to the cloud broker.
    #[default]
    LocalThenCloud,
    /// Cloud broker, falling back to the local broker.
    CloudThenLocal,
    /// Cloud broker only.
    CloudOnly,
}

impl ConnectionMode {
    /// Returns the brokers to attempt, in order.
    #[must_use]
    pub const fn legs(&self) -> &'static [BrokerKind] {
        match self {
            Self::LocalOnly => &[BrokerKind::Local],
            Self::LocalThenCloud => &[BrokerKind::Local, BrokerKind::Cloud],
            Self::CloudThenLocal => &[BrokerKind::Cloud, BrokerKind::Local],
            Self::CloudOnly => &[BrokerKind::Cloud],
        }
    }

    /// Returns `true` if the local broker is among the legs.
    #[must_use]
    pub fn uses_local(&self) -> bool {
        self.legs().contains(&BrokerKind::Local)
    }

    /// Returns `true` if the cloud broker is among the legs.
    #[must_use]
    pub fn uses_cloud(&self) -> bool {
        self.legs().contains(&BrokerKind::Cloud)
    }

    /// Returns the configuration token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LocalOnly => "local-only",
            Self::LocalThenCloud => "local-then-cloud",
            Self::CloudThenLocal => "cloud-then-local",
            Self::CloudOnly => "cloud-only",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local-only" => Ok(Self::LocalOnly),
            "local-then-cloud" => Ok(Self::LocalThenCloud),
            "cloud-then-local" => Ok(Self::CloudThenLocal),
            "cloud-only" => Ok(Self::CloudOnly),
            _ => Err(ValueError::InvalidToken {
                kind: "connection mode",
                token: s.to_string(),
            }),
        }
    }
}

/// The two kinds of broker a device can be reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    /// Broker embedded in the device on the local network.
    Local,
    /// Vendor cloud IoT broker.
    Cloud,
}

impl fmt::Display for BrokerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        })
    }
}

/// Credential for the local broker.
#[derive(Clone, PartialEq, Eq)]
pub enum LocalCredential {
    /// The broker password hash, ready to use.
    PasswordHash(String),
    /// The encrypted credential blob issued by the vendor cloud.
    Encrypted(String),
}

impl LocalCredential {
    /// Wraps a ready-to-use password hash.
    #[must_use]
    pub fn password_hash(hash: impl Into<String>) -> Self {
        Self::PasswordHash(hash.into())
    }

    /// Wraps an encrypted credential blob.
    #[must_use]
    pub fn encrypted(blob: impl Into<String>) -> Self {
        Self::Encrypted(blob.into())
    }

    /// Returns the broker password, unwrapping it if needed.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if an encrypted blob cannot be unwrapped.
    pub fn resolve(&self) -> Result<String, CredentialError> {
        match self {
            Self::PasswordHash(hash) => Ok(hash.clone()),
            Self::Encrypted(blob) => crate::credentials::decrypt_local_credential(blob),
        }
    }
}

impl fmt::Debug for LocalCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PasswordHash(_) => f.write_str("PasswordHash(***)"),
            Self::Encrypted(_) => f.write_str("Encrypted(***)"),
        }
    }
}

/// Address of the cloud IoT broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudEndpoint {
    /// Broker host name.
    pub host: String,
    /// Broker TLS port.
    #[serde(default = "default_cloud_port")]
    pub port: u16,
}

fn default_cloud_port() -> u16 {
    DEFAULT_CLOUD_PORT
}

impl CloudEndpoint {
    /// Creates an endpoint on the default TLS port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_CLOUD_PORT,
        }
    }

    /// Overrides the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Credential bundle for the cloud IoT broker, derived from account login by
/// the account layer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudCredentials {
    /// MQTT client id the broker expects.
    pub client_id: String,
    /// MQTT user name (token authorizer name or account id).
    pub username: String,
    /// Bearer token used as the MQTT password.
    pub password: String,
}

impl fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Device family, used to choose the accessor set and command sub-APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceCategory {
    /// Plain fan.
    Fan,
    /// Purifier fan.
    #[default]
    PurifierFan,
    /// Purifier fan with heater.
    PurifierHeater,
    /// Purifier with humidifier.
    PurifierHumidifier,
    /// Robot vacuum.
    RobotVacuum,
}

impl DeviceCategory {
    /// Looks up the category of a known product type code.
    ///
    /// # Examples
    ///
    /// ```
    /// use ventlink_lib::config::DeviceCategory;
    ///
    /// assert_eq!(DeviceCategory::from_product_type("527"), Some(DeviceCategory::PurifierHeater));
    /// assert_eq!(DeviceCategory::from_product_type("N223"), Some(DeviceCategory::RobotVacuum));
    /// assert_eq!(DeviceCategory::from_product_type("999"), None);
    /// ```
    #[must_use]
    pub fn from_product_type(product_type: &str) -> Option<Self> {
        match product_type {
            "469" | "475" | "520" | "438" | "438E" | "438K" | "664" => Some(Self::PurifierFan),
            "455" | "527" | "527E" | "527K" => Some(Self::PurifierHeater),
            "358" | "358E" | "358K" => Some(Self::PurifierHumidifier),
            "N223" | "276" | "277" => Some(Self::RobotVacuum),
            _ => None,
        }
    }

    /// Returns `true` for robot vacuums.
    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::RobotVacuum)
    }
}

/// Immutable connection configuration for one device.
#[derive(Debug, Clone)]
pub struct DeviceConnectionConfig {
    serial: String,
    product_type: String,
    topic_prefix: String,
    host: Option<String>,
    local_port: u16,
    local_credential: Option<LocalCredential>,
    mode: ConnectionMode,
    cloud_endpoint: Option<CloudEndpoint>,
    cloud_credentials: Option<CloudCredentials>,
    category: DeviceCategory,
    capabilities: Capabilities,
    keep_alive: Duration,
    connect_timeout: Duration,
}

impl DeviceConnectionConfig {
    /// Starts a builder for the device with the given serial number and
    /// product type code.
    #[must_use]
    pub fn builder(
        serial: impl Into<String>,
        product_type: impl Into<String>,
    ) -> DeviceConnectionConfigBuilder {
        DeviceConnectionConfigBuilder::new(serial.into(), product_type.into())
    }

    /// Returns the device serial number.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the product type code.
    #[must_use]
    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// Returns the topic prefix (the product type unless overridden).
    #[must_use]
    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }

    /// Returns the local host name or address.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the local broker port.
    #[must_use]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Returns the local broker credential.
    #[must_use]
    pub fn local_credential(&self) -> Option<&LocalCredential> {
        self.local_credential.as_ref()
    }

    /// Returns the connection mode.
    #[must_use]
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Returns the cloud endpoint.
    #[must_use]
    pub fn cloud_endpoint(&self) -> Option<&CloudEndpoint> {
        self.cloud_endpoint.as_ref()
    }

    /// Returns the cloud credential bundle.
    #[must_use]
    pub fn cloud_credentials(&self) -> Option<&CloudCredentials> {
        self.cloud_credentials.as_ref()
    }

    /// Returns the device category.
    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        self.category
    }

    /// Returns the declared capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the MQTT keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the per-broker connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

/// Builder for [`DeviceConnectionConfig`].
#[derive(Debug)]
pub struct DeviceConnectionConfigBuilder {
    serial: String,
    product_type: String,
    topic_prefix: Option<String>,
    host: Option<String>,
    local_port: u16,
    local_credential: Option<LocalCredential>,
    mode: ConnectionMode,
    cloud_endpoint: Option<CloudEndpoint>,
    cloud_credentials: Option<CloudCredentials>,
    category: Option<DeviceCategory>,
    capabilities: Capabilities,
    keep_alive: Duration,
    connect_timeout: Duration,
}

impl DeviceConnectionConfigBuilder {
    fn new(serial: String, product_type: String) -> Self {
        Self {
            serial,
            product_type,
            topic_prefix: None,
            host: None,
            local_port: DEFAULT_LOCAL_PORT,
            local_credential: None,
            mode: ConnectionMode::default(),
            cloud_endpoint: None,
            cloud_credentials: None,
            category: None,
            capabilities: Capabilities::new(),
            keep_alive: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the local host name or address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the local broker port (default: 1883).
    #[must_use]
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Sets the local broker credential.
    #[must_use]
    pub fn local_credential(mut self, credential: LocalCredential) -> Self {
        self.local_credential = Some(credential);
        self
    }

    /// Overrides the topic prefix (default: the product type).
    #[must_use]
    pub fn topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = Some(prefix.into());
        self
    }

    /// Sets the connection mode (default: local, then cloud).
    #[must_use]
    pub fn mode(mut self, mode: ConnectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the cloud endpoint and credential bundle.
    #[must_use]
    pub fn cloud(mut self, endpoint: CloudEndpoint, credentials: CloudCredentials) -> Self {
        self.cloud_endpoint = Some(endpoint);
        self.cloud_credentials = Some(credentials);
        self
    }

    /// Sets the device category (default: looked up from the product type).
    #[must_use]
    pub fn category(mut self, category: DeviceCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the declared capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the MQTT keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets the per-broker connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if:
    /// - the serial number or product type is empty
    /// - the mode uses the local broker but no host or credential is set
    /// - the mode uses the cloud broker but no endpoint is set
    pub fn build(self) -> Result<DeviceConnectionConfig, Error> {
        if self.serial.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "serial number is required".to_string(),
            ));
        }
        if self.product_type.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "product type is required".to_string(),
            ));
        }
        if self.mode.uses_local() && (self.host.is_none() || self.local_credential.is_none()) {
            return Err(Error::InvalidConfiguration(format!(
                "mode {} needs a local host and credential",
                self.mode
            )));
        }
        if self.mode.uses_cloud() && self.cloud_endpoint.is_none() {
            return Err(Error::InvalidConfiguration(format!(
                "mode {} needs a cloud endpoint",
                self.mode
            )));
        }

        let category = self
            .category
            .or_else(|| DeviceCategory::from_product_type(&self.product_type))
            .unwrap_or_default();
        let topic_prefix = self
            .topic_prefix
            .unwrap_or_else(|| self.product_type.clone());

        Ok(DeviceConnectionConfig {
            serial: self.serial,
            product_type: self.product_type,
            topic_prefix,
            host: self.host,
            local_port: self.local_port,
            local_credential: self.local_credential,
            mode: self.mode,
            cloud_endpoint: self.cloud_endpoint,
            cloud_credentials: self.cloud_credentials,
            category,
            capabilities: self.capabilities,
            keep_alive: self.keep_alive,
            connect_timeout: self.connect_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_builder() -> DeviceConnectionConfigBuilder {
        DeviceConnectionConfig::builder("SERIAL-1", "438")
            .host("10.0.0.2")
            .local_credential(LocalCredential::password_hash("secret"))
    }

    #[test]
    fn mode_legs_order() {
        assert_eq!(
            ConnectionMode::CloudThenLocal.legs(),
            &[BrokerKind::Cloud, BrokerKind::Local]
        );
        assert_eq!(ConnectionMode::LocalOnly.legs(), &[BrokerKind::Local]);
    }

    #[test]
    fn mode_tokens_round_trip() {
        for mode in [
            ConnectionMode::LocalOnly,
            ConnectionMode::LocalThenCloud,
            ConnectionMode::CloudThenLocal,
            ConnectionMode::CloudOnly,
        ] {
            assert_eq!(mode.as_str().parse::<ConnectionMode>().unwrap(), mode);
        }
        assert!("local".parse::<ConnectionMode>().is_err());
    }

    #[test]
    fn mode_deserializes_from_kebab_case() {
        let mode: ConnectionMode = serde_json::from_str("\"cloud-only\"").unwrap();
        assert_eq!(mode, ConnectionMode::CloudOnly);
    }

    #[test]
    fn builder_defaults() {
        let config = local_builder()
            .mode(ConnectionMode::LocalOnly)
            .build()
            .unwrap();
        assert_eq!(config.local_port(), 1883);
        assert_eq!(config.topic_prefix(), "438");
        assert_eq!(config.category(), DeviceCategory::PurifierFan);
        assert_eq!(config.keep_alive(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn cloud_mode_requires_endpoint() {
        let result = local_builder().mode(ConnectionMode::LocalThenCloud).build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn local_mode_requires_host() {
        let result = DeviceConnectionConfig::builder("SERIAL-1", "438")
            .mode(ConnectionMode::LocalOnly)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn empty_serial_is_rejected() {
        let result = DeviceConnectionConfig::builder(" ", "438").build();
        assert!(result.is_err());
    }

    #[test]
    fn explicit_category_and_prefix_win() {
        let config = local_builder()
            .mode(ConnectionMode::LocalOnly)
            .category(DeviceCategory::Fan)
            .topic_prefix("custom")
            .build()
            .unwrap();
        assert_eq!(config.category(), DeviceCategory::Fan);
        assert_eq!(config.topic_prefix(), "custom");
    }

    #[test]
    fn credentials_are_redacted_in_debug() {
        let creds = CloudCredentials {
            client_id: "client".to_string(),
            username: "user".to_string(),
            password: "token".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("token"));
        assert!(!format!("{:?}", LocalCredential::password_hash("pw")).contains("pw"));
    }
}
