// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware upgrade metadata.
//!
//! The engine never transfers firmware itself. It asks the device to fetch a
//! manifest from the vendor OTA host and relays the progress the device
//! reports on its software-status topic.

use serde_json::Value;

use crate::error::ParseError;

const OTA_HOST: &str = "https://ota-firmware.cp.dyson.com";
const OTA_CHANNEL: &str = "M__SC04.WF02";

/// Builds the manifest URL a device downloads an upgrade from.
///
/// # Examples
///
/// ```
/// use ventlink_lib::firmware::manifest_url;
///
/// assert_eq!(
///     manifest_url("438", "21.04.03"),
///     "https://ota-firmware.cp.dyson.com/438/M__SC04.WF02/21.04.03/manifest.bin"
/// );
/// ```
#[must_use]
pub fn manifest_url(product_type: &str, version: &str) -> String {
    format!(
        "{OTA_HOST}/{}/{OTA_CHANNEL}/{}/manifest.bin",
        urlencoding::encode(product_type),
        urlencoding::encode(version)
    )
}

/// A firmware progress report from the software-status topic.
#[derive(Debug, Clone, PartialEq)]
pub struct FirmwareStatus {
    /// Message discriminator.
    pub msg: String,
    /// Version being installed, if reported.
    pub version: Option<String>,
    /// Reported status token, if any.
    pub state: Option<String>,
    /// Progress in percent, if reported.
    pub progress: Option<u8>,
    /// The whole payload.
    pub raw: Value,
}

impl FirmwareStatus {
    /// Decodes a software-status payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not a JSON object with a string
    /// `msg` field.
    pub fn decode(payload: &str) -> Result<Self, ParseError> {
        let raw: Value = serde_json::from_str(payload)?;
        if !raw.is_object() {
            return Err(ParseError::UnexpectedFormat(
                "software status is not a JSON object".to_string(),
            ));
        }
        let msg = raw
            .get("msg")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingField("msg".to_string()))?
            .to_string();

        let field = |key: &str| raw.get(key).or_else(|| raw.get("data")?.get(key));
        let version = field("version").and_then(Value::as_str).map(str::to_string);
        let state = field("status")
            .or_else(|| field("state"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let progress = field("progress").and_then(|value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        let progress = progress.map(|p| u8::try_from(p.min(100)).unwrap_or(100));

        Ok(Self {
            msg,
            version,
            state,
            progress,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_url_escapes_segments() {
        assert_eq!(
            manifest_url("527K", "1 2"),
            "https://ota-firmware.cp.dyson.com/527K/M__SC04.WF02/1%202/manifest.bin"
        );
    }

    #[test]
    fn decode_progress_report() {
        let status = FirmwareStatus::decode(
            r#"{"msg":"SOFTWARE-UPGRADE-PROGRESS","time":"t","data":{"version":"21.04.03","status":"DOWNLOADING","progress":"0042"}}"#,
        )
        .unwrap();
        assert_eq!(status.version.as_deref(), Some("21.04.03"));
        assert_eq!(status.state.as_deref(), Some("DOWNLOADING"));
        assert_eq!(status.progress, Some(42));
    }

    #[test]
    fn decode_top_level_fields() {
        let status =
            FirmwareStatus::decode(r#"{"msg":"SOFTWARE-UPGRADE-COMPLETE","version":"2.0","progress":250}"#)
                .unwrap();
        assert_eq!(status.msg, "SOFTWARE-UPGRADE-COMPLETE");
        assert_eq!(status.progress, Some(100));
        assert_eq!(status.state, None);
    }

    #[test]
    fn decode_rejects_missing_msg() {
        assert!(FirmwareStatus::decode(r#"{"version":"1"}"#).is_err());
        assert!(FirmwareStatus::decode("[]").is_err());
    }
}
