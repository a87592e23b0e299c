// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `VentLink` library.
//!
//! Errors that prevent communication (connecting, unwrapping credentials,
//! encoding a command) are returned to the caller. Errors met while handling
//! asynchronous push traffic are logged and absorbed by the message router and
//! never show up here.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A command value was rejected before publishing.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The local broker credential could not be unwrapped.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Device is not connected.
    #[error("device is not connected")]
    NotConnected,

    /// Device does not declare the capability needed by the command.
    #[error("device does not support {capability}")]
    CapabilityNotSupported {
        /// The capability that is missing.
        capability: String,
    },

    /// Device configuration is invalid.
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i32,
        /// Maximum allowed value.
        max: i32,
        /// The actual value that was provided.
        actual: i32,
    },

    /// A fan speed token was neither a level nor `AUTO`.
    #[error("invalid fan speed: {0}")]
    InvalidFanSpeed(String),

    /// An enum token was not recognized.
    #[error("invalid {kind}: {token}")]
    InvalidToken {
        /// What kind of token was being parsed.
        kind: &'static str,
        /// The rejected token.
        token: String,
    },
}

/// Errors related to MQTT communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request failed.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt timed out.
    #[error("connection timed out after {0} ms")]
    Timeout(u64),

    /// Invalid host or port.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A cloud connection was requested without an endpoint.
    #[error("no cloud endpoint configured")]
    MissingCloudEndpoint,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing device payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// Unexpected payload format.
    #[error("unexpected payload format: {0}")]
    UnexpectedFormat(String),
}

/// Errors met while unwrapping the encrypted local credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential is not valid base64.
    #[error("credential is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// AES decryption or padding removal failed.
    #[error("credential decryption failed")]
    Decrypt,

    /// Decrypted credential is not UTF-8.
    #[error("decrypted credential is not UTF-8")]
    Utf8,

    /// Decrypted credential is not the expected JSON document.
    #[error("decrypted credential is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Decrypted document carries no password hash.
    #[error("decrypted credential has no password hash")]
    MissingPasswordHash,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
