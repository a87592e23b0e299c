// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fault code translation.
//!
//! Fault reports arrive in several shapes depending on firmware generation:
//! sectioned maps (`product-errors`, `module-warnings`, ...), flat
//! code-to-value maps, or lists of `{code, value}` objects. [`normalize_faults`]
//! flattens all of them into [`FaultEntry`] values and drops every entry whose
//! value denotes a healthy state.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use ventlink_lib::fault::normalize_faults;
//!
//! let raw = json!({
//!     "product-warnings": { "fltr": "OK", "hflr": "FAIL" },
//!     "module-errors": { "szme": "OK" }
//! });
//!
//! let faults = normalize_faults(&raw);
//! assert_eq!(faults.len(), 1);
//! assert_eq!(faults[0].code, "hflr");
//! assert_eq!(faults[0].description, "HEPA filter needs replacing");
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Description used when a `(code, value)` pair is not in the table.
pub const UNSPECIFIED_FAULT: &str = "Unspecified fault";

/// Sections of a fault-topic message.
const SECTIONS: [&str; 4] = [
    "product-errors",
    "product-warnings",
    "module-errors",
    "module-warnings",
];

/// Values that mean "no fault".
const HEALTHY: [&str; 3] = ["OK", "NONE", "NORM"];

/// `(code, value, description)`; a `*` value matches any unhealthy value.
const FAULT_TABLE: &[(&str, &str, &str)] = &[
    ("fltr", "FAIL", "Filter needs replacing"),
    ("hflr", "FAIL", "HEPA filter needs replacing"),
    ("cflr", "FAIL", "Carbon filter needs replacing"),
    ("amf1", "FAIL", "Air quality sensor fault"),
    ("amf2", "FAIL", "Particulate sensor fault"),
    ("amf3", "FAIL", "VOC sensor fault"),
    ("amf4", "FAIL", "Temperature sensor fault"),
    ("amf5", "FAIL", "Humidity sensor fault"),
    ("amf6", "FAIL", "Motor fault"),
    ("amf7", "FAIL", "Fan stalled"),
    ("hmf1", "FAIL", "Heater fault"),
    ("hmf2", "FAIL", "Heater overheated"),
    ("tilt", "TILT", "Device tilted"),
    ("tnke", "FAIL", "Water tank empty"),
    ("tnkp", "FAIL", "Water tank not fitted"),
    ("cldu", "FAIL", "Deep clean required"),
    ("etws", "FAIL", "Evaporator needs cleaning"),
    ("wpmp", "FAIL", "Water pump fault"),
    ("ercd", "*", "Device error reported"),
    ("wacd", "*", "Device warning reported"),
];

/// A single active fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultEntry {
    /// Raw fault code.
    pub code: String,
    /// Raw fault value.
    pub value: String,
    /// Human readable description.
    pub description: String,
    /// When the fault was observed.
    pub observed_at: DateTime<Utc>,
}

impl FaultEntry {
    /// Creates an entry, translating the description from the table.
    #[must_use]
    pub fn new(code: impl Into<String>, value: impl Into<String>, at: DateTime<Utc>) -> Self {
        let code = code.into();
        let value = value.into();
        let description = translate(&code, &value).to_string();
        Self {
            code,
            value,
            description,
            observed_at: at,
        }
    }
}

/// Returns `true` if `value` denotes a healthy state.
#[must_use]
pub fn is_healthy(value: &str) -> bool {
    HEALTHY
        .iter()
        .any(|healthy| healthy.eq_ignore_ascii_case(value.trim()))
}

/// Looks up the description of `(code, value)`.
///
/// Unknown combinations yield [`UNSPECIFIED_FAULT`].
#[must_use]
pub fn translate(code: &str, value: &str) -> &'static str {
    FAULT_TABLE
        .iter()
        .find(|(c, v, _)| *c == code && (*v == value || *v == "*"))
        .map_or(UNSPECIFIED_FAULT, |(_, _, description)| description)
}

/// Flattens a raw fault payload into the list of active faults.
#[must_use]
pub fn normalize_faults(raw: &Value) -> Vec<FaultEntry> {
    let now = Utc::now();
    let mut pairs = Vec::new();

    match raw {
        Value::Object(map) if SECTIONS.iter().any(|s| map.contains_key(*s)) => {
            for section in SECTIONS {
                if let Some(nested) = map.get(section) {
                    collect_pairs(nested, &mut pairs);
                }
            }
        }
        Value::Object(map) => {
            let flat = map
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "msg" | "time"))
                .map(|(key, value)| (key.clone(), scalar_text(value)));
            pairs.extend(flat);
        }
        other => collect_pairs(other, &mut pairs),
    }

    pairs
        .into_iter()
        .filter(|(_, value)| !is_healthy(value))
        .map(|(code, value)| FaultEntry::new(code, value, now))
        .collect()
}

fn collect_pairs(value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            out.extend(map.iter().map(|(k, v)| (k.clone(), scalar_text(v))));
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(entry) => {
                        if let Some(code) = entry.get("code").and_then(Value::as_str) {
                            let value = entry.get("value").map(scalar_text).unwrap_or_default();
                            out.push((code.to_string(), value));
                        }
                    }
                    Value::Array(pair) => {
                        if let [Value::String(code), value] = pair.as_slice() {
                            out.push((code.clone(), scalar_text(value)));
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Renders a JSON value the way the state map stores it.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn healthy_values_are_case_insensitive() {
        for value in ["OK", "ok", "None", "NORM", " norm "] {
            assert!(is_healthy(value), "{value}");
        }
        assert!(!is_healthy("FAIL"));
        assert!(!is_healthy(""));
    }

    #[test]
    fn translate_known_and_unknown() {
        assert_eq!(translate("tnke", "FAIL"), "Water tank empty");
        assert_eq!(translate("ercd", "57C2"), "Device error reported");
        assert_eq!(translate("zzzz", "FAIL"), UNSPECIFIED_FAULT);
        assert_eq!(translate("tnke", "WEIRD"), UNSPECIFIED_FAULT);
    }

    #[test]
    fn only_ok_entries_yield_nothing() {
        let raw = json!({
            "product-errors": { "amf1": "OK", "amf2": "OK" },
            "product-warnings": { "fltr": "OK" },
            "module-errors": { "szme": "NONE" },
            "module-warnings": { "srnk": "norm" }
        });
        assert!(normalize_faults(&raw).is_empty());
    }

    #[test]
    fn flat_map_shape() {
        let raw = json!({ "msg": "CURRENT-FAULTS", "time": "t", "tnke": "FAIL", "fltr": "OK" });
        let faults = normalize_faults(&raw);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].code, "tnke");
    }

    #[test]
    fn list_shapes() {
        let raw = json!([
            { "code": "hflr", "value": "FAIL" },
            { "code": "cflr", "value": "OK" },
            ["tilt", "TILT"],
            ["amf1", "OK"],
            42
        ]);
        let codes: Vec<_> = normalize_faults(&raw)
            .into_iter()
            .map(|entry| entry.code)
            .collect();
        assert_eq!(codes, vec!["hflr", "tilt"]);
    }

    #[test]
    fn no_healthy_entry_ever_survives() {
        let raw = json!([
            ["a", "OK"], ["b", "ok"], ["c", "NONE"], ["d", "NORM"], ["e", "FAIL"]
        ]);
        let faults = normalize_faults(&raw);
        assert!(faults.iter().all(|f| !is_healthy(&f.value)));
        assert_eq!(faults.len(), 1);
    }

    #[test]
    fn unexpected_payload_is_empty() {
        assert!(normalize_faults(&json!("FAIL")).is_empty());
        assert!(normalize_faults(&Value::Null).is_empty());
    }
}
