// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data requests, firmware upgrade and raw commands.

use serde_json::{Map, Value};

use super::Command;
use crate::error::ValueError;
use crate::firmware::manifest_url;

/// Asks the device to publish some part of its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    /// Full product state, answered with `CURRENT-STATE`.
    CurrentState,
    /// Active faults, answered with `CURRENT-FAULTS`.
    CurrentFaults,
    /// Sensor readings, answered with `ENVIRONMENTAL-CURRENT-SENSOR-DATA`.
    EnvironmentalData,
}

impl Request {
    /// Requests sent right after a session comes up.
    pub const INITIAL: [Self; 3] = [Self::CurrentState, Self::EnvironmentalData, Self::CurrentFaults];

    /// Returns the wire discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentState => "REQUEST-CURRENT-STATE",
            Self::CurrentFaults => "REQUEST-CURRENT-FAULTS",
            Self::EnvironmentalData => "REQUEST-PRODUCT-ENVIRONMENT-CURRENT-SENSOR-DATA",
        }
    }
}

impl Command for Request {
    fn msg(&self) -> &str {
        self.as_str()
    }
}

/// Tells the device to fetch and install a firmware version.
///
/// # Examples
///
/// ```
/// use ventlink_lib::command::{Command, SoftwareUpgrade};
///
/// let cmd = SoftwareUpgrade::new("438", "21.04.03").unwrap();
/// let extra = cmd.extra();
/// assert_eq!(extra["version"], "21.04.03");
/// assert!(extra["url"].as_str().unwrap().ends_with("/manifest.bin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareUpgrade {
    version: String,
    url: String,
}

impl SoftwareUpgrade {
    /// Builds the upgrade command for `product_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if `version` is blank.
    pub fn new(product_type: &str, version: &str) -> Result<Self, ValueError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(ValueError::InvalidToken {
                kind: "firmware version",
                token: String::new(),
            });
        }
        Ok(Self {
            url: manifest_url(product_type, version),
            version: version.to_string(),
        })
    }

    /// Returns the target version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the manifest URL the device will download.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Command for SoftwareUpgrade {
    fn msg(&self) -> &str {
        "SOFTWARE-UPGRADE"
    }

    fn extra(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert("version".into(), Value::String(self.version.clone()));
        extra.insert("url".into(), Value::String(self.url.clone()));
        extra
    }
}

/// A command with a caller-chosen discriminator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommand {
    msg: String,
    data: Option<Map<String, Value>>,
}

impl RawCommand {
    /// Creates a command with discriminator `msg` and optional `data`.
    #[must_use]
    pub fn new(msg: impl Into<String>, data: Option<Map<String, Value>>) -> Self {
        Self {
            msg: msg.into(),
            data,
        }
    }
}

impl Command for RawCommand {
    fn msg(&self) -> &str {
        &self.msg
    }

    fn data(&self) -> Option<Map<String, Value>> {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_discriminators() {
        assert_eq!(Request::CurrentFaults.msg(), "REQUEST-CURRENT-FAULTS");
        assert_eq!(
            Request::EnvironmentalData.msg(),
            "REQUEST-PRODUCT-ENVIRONMENT-CURRENT-SENSOR-DATA"
        );
        assert_eq!(Request::INITIAL[0], Request::CurrentState);
    }

    #[test]
    fn upgrade_rejects_blank_version() {
        assert!(SoftwareUpgrade::new("438", "  ").is_err());
    }

    #[test]
    fn upgrade_carries_url_and_version() {
        let cmd = SoftwareUpgrade::new("438", "21.04.03").unwrap();
        assert_eq!(cmd.version(), "21.04.03");
        assert!(cmd.url().contains("/438/"));
        assert!(cmd.data().is_none());
    }

    #[test]
    fn raw_command_passes_through() {
        let mut data = Map::new();
        data.insert("fpwr".into(), Value::String("ON".into()));
        let cmd = RawCommand::new("STATE-SET", Some(data));
        assert_eq!(cmd.msg(), "STATE-SET");
        assert_eq!(cmd.data().unwrap()["fpwr"], "ON");
    }
}
