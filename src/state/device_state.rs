// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot of the product-state map.

use chrono::{DateTime, Utc};

use super::StateMap;
use crate::fault::{self, FaultEntry};

/// Returns the value stored under `key`, or `default` when the key is absent.
///
/// This is the single access primitive every typed accessor builds on. It
/// never fails.
///
/// # Examples
///
/// ```
/// use ventlink_lib::state::{StateMap, get_value};
///
/// let map = StateMap::from([("fnsp".to_string(), "0004".to_string())]);
/// assert_eq!(get_value(&map, "fnsp", "AUTO"), "0004");
/// assert_eq!(get_value(&map, "oson", "OFF"), "OFF");
/// ```
#[must_use]
pub fn get_value<'a>(map: &'a StateMap, key: &str, default: &'a str) -> &'a str {
    map.get(key).map_or(default, String::as_str)
}

/// A consistent copy of the device's last-known product state.
///
/// Produced by [`StateStore::snapshot`](super::StateStore::snapshot); mutating
/// it has no effect on the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    fields: StateMap,
}

impl DeviceState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a raw key/value map.
    #[must_use]
    pub fn from_map(fields: StateMap) -> Self {
        Self { fields }
    }

    /// Returns the raw value for `key`, if reported.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the raw value for `key`, or `default`.
    #[must_use]
    pub fn value_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        get_value(&self.fields, key, default)
    }

    /// Returns `true` if the device reported `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the number of reported keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing has been reported yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the raw key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrows the raw map.
    #[must_use]
    pub fn as_map(&self) -> &StateMap {
        &self.fields
    }

    /// Consumes the snapshot and returns the raw map.
    #[must_use]
    pub fn into_map(self) -> StateMap {
        self.fields
    }

    /// Translates the error (`ercd`) and warning (`wacd`) codes carried in the
    /// product state into fault entries stamped with `observed_at`.
    ///
    /// Healthy codes (`NONE`, `OK`) yield no entry.
    #[must_use]
    pub fn faults(&self, observed_at: DateTime<Utc>) -> Vec<FaultEntry> {
        derive_faults(&self.fields, observed_at)
    }
}

/// Codes of the product state that carry fault information.
const STATE_FAULT_CODES: [&str; 2] = ["ercd", "wacd"];

pub(crate) fn derive_faults(map: &StateMap, observed_at: DateTime<Utc>) -> Vec<FaultEntry> {
    STATE_FAULT_CODES
        .into_iter()
        .filter_map(|key| {
            let value = map.get(key)?;
            (!fault::is_healthy(value)).then(|| FaultEntry::new(key, value.as_str(), observed_at))
        })
        .collect()
}

impl From<StateMap> for DeviceState {
    fn from(fields: StateMap) -> Self {
        Self::from_map(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pairs: &[(&str, &str)]) -> DeviceState {
        DeviceState::from_map(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn get_value_returns_default_for_absent_keys() {
        let map = StateMap::new();
        for key in ["fpwr", "", "does-not-exist", "ünïcode"] {
            assert_eq!(get_value(&map, key, "fallback"), "fallback");
        }
    }

    #[test]
    fn get_value_prefers_reported_value() {
        let s = state(&[("fpwr", "ON")]);
        assert_eq!(s.value_or("fpwr", "OFF"), "ON");
        assert_eq!(s.get("fnsp"), None);
    }

    #[test]
    fn faults_skip_healthy_codes() {
        let s = state(&[("ercd", "NONE"), ("wacd", "OK")]);
        assert!(s.faults(Utc::now()).is_empty());
    }

    #[test]
    fn faults_report_active_codes() {
        let s = state(&[("ercd", "02C0"), ("wacd", "NONE")]);
        let at = Utc::now();
        let faults = s.faults(at);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].code, "ercd");
        assert_eq!(faults[0].value, "02C0");
        assert_eq!(faults[0].observed_at, at);
    }

    #[test]
    fn iter_is_key_ordered() {
        let s = state(&[("oson", "ON"), ("fnsp", "0003")]);
        let keys: Vec<_> = s.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["fnsp", "oson"]);
    }
}
