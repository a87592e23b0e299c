// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection state types.

use std::fmt;

use crate::config::BrokerKind;
use crate::error::ProtocolError;

/// Internal session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No session.
    #[default]
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected to the device's own broker.
    ConnectedLocal,
    /// Connected to the cloud broker.
    ConnectedCloud,
}

impl ConnectionState {
    /// Returns the externally visible status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        match self {
            Self::ConnectedLocal => ConnectionStatus::Local,
            Self::ConnectedCloud => ConnectionStatus::Cloud,
            Self::Disconnected | Self::Connecting => ConnectionStatus::Disconnected,
        }
    }

    /// Returns the state for a session on `kind`.
    #[must_use]
    pub const fn connected_via(kind: BrokerKind) -> Self {
        match kind {
            BrokerKind::Local => Self::ConnectedLocal,
            BrokerKind::Cloud => Self::ConnectedCloud,
        }
    }
}

/// Connection status as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    /// Connected through the local broker.
    Local,
    /// Connected through the cloud broker.
    Cloud,
    /// Not connected.
    #[default]
    Disconnected,
}

impl ConnectionStatus {
    /// Returns `true` for `Local` and `Cloud`.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
            Self::Disconnected => "disconnected",
        })
    }
}

/// Why one broker could not be used.
#[derive(Debug)]
pub struct BrokerFailure {
    /// The broker that failed.
    pub kind: BrokerKind,
    /// What went wrong.
    pub error: ProtocolError,
}

impl fmt::Display for BrokerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} broker: {}", self.kind, self.error)
    }
}

/// Result of a connection attempt.
///
/// A failed attempt is an ordinary outcome: `status` is `Disconnected` and
/// `failures` lists every broker that was tried.
#[derive(Debug, Default)]
pub struct ConnectOutcome {
    /// Resulting status.
    pub status: ConnectionStatus,
    /// Failures met along the way, in attempt order.
    pub failures: Vec<BrokerFailure>,
}

impl ConnectOutcome {
    /// Returns `true` if a session is up.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.status.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_to_status() {
        assert_eq!(ConnectionState::Connecting.status(), ConnectionStatus::Disconnected);
        assert_eq!(ConnectionState::ConnectedCloud.status(), ConnectionStatus::Cloud);
        assert_eq!(
            ConnectionState::connected_via(BrokerKind::Local),
            ConnectionState::ConnectedLocal
        );
    }

    #[test]
    fn failed_outcome_is_not_connected() {
        let outcome = ConnectOutcome {
            status: ConnectionStatus::Disconnected,
            failures: vec![BrokerFailure {
                kind: BrokerKind::Local,
                error: ProtocolError::Timeout(10_000),
            }],
        };
        assert!(!outcome.is_connected());
        assert_eq!(
            outcome.failures[0].to_string(),
            "local broker: connection timed out after 10000 ms"
        );
    }
}
