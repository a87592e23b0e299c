// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON message envelope.
//!
//! Every message carries a `msg` discriminator and a `time` stamp. Outbound
//! commands put their settings under `data`; some commands (robot actions,
//! firmware upgrades) carry extra top-level fields instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::fault::scalar_text;
use crate::state::StateMap;

/// `CURRENT-STATE` discriminator.
pub const CURRENT_STATE: &str = "CURRENT-STATE";
/// `STATE-CHANGE` discriminator.
pub const STATE_CHANGE: &str = "STATE-CHANGE";
/// `ENVIRONMENTAL-CURRENT-SENSOR-DATA` discriminator.
pub const ENVIRONMENTAL_DATA: &str = "ENVIRONMENTAL-CURRENT-SENSOR-DATA";
/// `CURRENT-FAULTS` discriminator.
pub const CURRENT_FAULTS: &str = "CURRENT-FAULTS";

/// Formats a timestamp as ISO-8601 UTC with millisecond precision.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ventlink_lib::protocol::format_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
/// assert_eq!(format_timestamp(at), "2024-05-01T08:30:00.000Z");
/// ```
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    msg: String,
    time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Envelope {
    /// Creates an envelope stamped with `at`.
    #[must_use]
    pub fn new(msg: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            msg: msg.into(),
            time: format_timestamp(at),
            data: None,
            extra: Map::new(),
        }
    }

    /// Sets the `data` object.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a top-level field next to `msg` and `time`.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the discriminator.
    #[must_use]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Returns the `data` object, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    /// Serializes the envelope to JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if serialization fails.
    pub fn encode(&self) -> Result<String, ParseError> {
        serde_json::to_string(self).map_err(ParseError::from)
    }
}

/// A decoded message from the `status/current` topic.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Full product-state snapshot.
    CurrentState(StateMap),
    /// Changed product-state keys.
    StateChange(StateMap),
    /// Environmental sensor readings.
    Environmental(StateMap),
    /// Fault report.
    Faults(Value),
    /// A discriminator this engine does not handle.
    Unknown(String),
}

impl InboundMessage {
    /// Decodes a `status/current` payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not a JSON object with a string
    /// `msg` field.
    ///
    /// # Examples
    ///
    /// ```
    /// use ventlink_lib::protocol::InboundMessage;
    ///
    /// let message = InboundMessage::decode(
    ///     r#"{"msg":"STATE-CHANGE","time":"t","product-state":{"fnsp":["0004","0006"]}}"#,
    /// )
    /// .unwrap();
    ///
    /// let InboundMessage::StateChange(delta) = message else { panic!() };
    /// assert_eq!(delta["fnsp"], "0006");
    /// ```
    pub fn decode(payload: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(payload)?;
        let Value::Object(doc) = value else {
            return Err(ParseError::UnexpectedFormat(
                "payload is not a JSON object".to_string(),
            ));
        };
        let msg = doc
            .get("msg")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingField("msg".to_string()))?;

        Ok(match msg {
            CURRENT_STATE => Self::CurrentState(product_state(&doc)),
            STATE_CHANGE => Self::StateChange(product_state(&doc)),
            ENVIRONMENTAL_DATA => Self::Environmental(product_state(&doc)),
            CURRENT_FAULTS => Self::Faults(Value::Object(doc)),
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Extracts the key/value map of a state-bearing message.
///
/// Fan firmware nests it under `product-state` (or `data` for sensor data),
/// with `[old, new]` pairs in change messages. Robot firmware puts fields at
/// the top level and reports its status as `newstate`.
fn product_state(doc: &Map<String, Value>) -> StateMap {
    let nested = doc
        .get("product-state")
        .or_else(|| doc.get("data"))
        .and_then(Value::as_object);

    match nested {
        Some(fields) => fields
            .iter()
            .map(|(key, value)| (key.clone(), latest_value(value)))
            .collect(),
        None => doc
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "msg" | "time"))
            .map(|(key, value)| {
                let key = if key == "newstate" { "state" } else { key.as_str() };
                (key.to_string(), scalar_text(value))
            })
            .collect(),
    }
}

fn latest_value(value: &Value) -> String {
    match value {
        Value::Array(pair) => pair.last().map(scalar_text).unwrap_or_default(),
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn envelope_with_data() {
        let mut data = Map::new();
        data.insert("fnsp".to_string(), Value::from("0006"));
        let json = Envelope::new("STATE-SET", at())
            .with_data(data)
            .encode()
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["msg"], "STATE-SET");
        assert_eq!(parsed["time"], "2024-01-02T03:04:05.000Z");
        assert_eq!(parsed["data"]["fnsp"], "0006");
    }

    #[test]
    fn envelope_without_data_omits_field() {
        let json = Envelope::new("REQUEST-CURRENT-STATE", at())
            .encode()
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("data").is_none());
    }

    #[test]
    fn envelope_extra_fields_are_top_level() {
        let json = Envelope::new("STATE-SET", at())
            .with_field("robotAction", "PAUSE")
            .encode()
            .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["robotAction"], "PAUSE");
    }

    #[test]
    fn timestamp_has_milliseconds() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(format_timestamp(at), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn decode_current_state() {
        let msg = InboundMessage::decode(
            r#"{"msg":"CURRENT-STATE","time":"t","product-state":{"fpwr":"ON","fnsp":"0006"}}"#,
        )
        .unwrap();
        let InboundMessage::CurrentState(state) = msg else {
            panic!("unexpected {msg:?}");
        };
        assert_eq!(state["fpwr"], "ON");
        assert_eq!(state["fnsp"], "0006");
    }

    #[test]
    fn decode_environmental_uses_data() {
        let msg = InboundMessage::decode(
            r#"{"msg":"ENVIRONMENTAL-CURRENT-SENSOR-DATA","time":"t","data":{"pm25":"0004","tact":"OFF"}}"#,
        )
        .unwrap();
        let InboundMessage::Environmental(data) = msg else {
            panic!("unexpected {msg:?}");
        };
        assert_eq!(data["pm25"], "0004");
        assert_eq!(data["tact"], "OFF");
    }

    #[test]
    fn decode_robot_state_change() {
        let msg = InboundMessage::decode(
            r#"{"msg":"STATE-CHANGE","time":"t","oldstate":"INACTIVE_CHARGED","newstate":"FULL_CLEAN_RUNNING","batteryChargeLevel":100,"globalPosition":[10,20]}"#,
        )
        .unwrap();
        let InboundMessage::StateChange(delta) = msg else {
            panic!("unexpected {msg:?}");
        };
        assert_eq!(delta["state"], "FULL_CLEAN_RUNNING");
        assert_eq!(delta["batteryChargeLevel"], "100");
        assert_eq!(delta["globalPosition"], "[10,20]");
        assert!(!delta.contains_key("msg"));
    }

    #[test]
    fn decode_unknown_discriminator() {
        let msg = InboundMessage::decode(r#"{"msg":"HELLO","time":"t"}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown("HELLO".to_string()));
    }

    #[test]
    fn decode_rejects_malformed() {
        assert!(matches!(
            InboundMessage::decode("not json"),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            InboundMessage::decode("[1,2]"),
            Err(ParseError::UnexpectedFormat(_))
        ));
        assert!(matches!(
            InboundMessage::decode(r#"{"time":"t"}"#),
            Err(ParseError::MissingField(_))
        ));
    }
}
