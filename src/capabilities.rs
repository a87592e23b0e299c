// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Declared capabilities and inferred power-control scheme.
//!
//! Two unrelated signals live here and must not be confused:
//!
//! - [`Capabilities`] is the *declared* feature set supplied by configuration.
//!   The engine never mutates it; it only gates optional commands.
//! - [`PowerControlDetector`] *infers*, from observed state traffic, which
//!   field the firmware uses for power control. No two device generations
//!   agree on this, and the inferred [`PowerControl`] is only used to encode
//!   power commands.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::StateMap;

/// An opaque feature tag declared for a device.
///
/// Well-known tags have their own variants; anything else round-trips
/// through [`Capability::Other`].
///
/// # Examples
///
/// ```
/// use ventlink_lib::Capability;
///
/// let cap: Capability = "Heating".parse().unwrap();
/// assert_eq!(cap, Capability::Heating);
/// assert_eq!(Capability::Other("Lighting".into()).to_string(), "Lighting");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Extended air-quality sensors (PM2.5/PM10, NO2, formaldehyde).
    ExtendedAq,
    /// Fan heater.
    Heating,
    /// Humidifier.
    Humidifier,
    /// On-device schedules.
    Scheduling,
    /// Environmental sensor data is published.
    EnvironmentalData,
    /// First-generation oscillation angle control (`osal`/`osau`).
    AdvanceOscillationDay0,
    /// Second-generation oscillation angle control (`osal`/`osau` + `ancp`).
    AdvanceOscillationDay1,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl Capability {
    /// Returns the tag string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ExtendedAq => "ExtendedAQ",
            Self::Heating => "Heating",
            Self::Humidifier => "Humidifier",
            Self::Scheduling => "Scheduling",
            Self::EnvironmentalData => "EnvironmentalData",
            Self::AdvanceOscillationDay0 => "AdvanceOscillationDay0",
            Self::AdvanceOscillationDay1 => "AdvanceOscillationDay1",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        match s {
            "ExtendedAQ" => Self::ExtendedAq,
            "Heating" => Self::Heating,
            "Humidifier" => Self::Humidifier,
            "Scheduling" => Self::Scheduling,
            "EnvironmentalData" => Self::EnvironmentalData,
            "AdvanceOscillationDay0" => Self::AdvanceOscillationDay0,
            "AdvanceOscillationDay1" => Self::AdvanceOscillationDay1,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for Capability {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// The declared capability set of a device.
///
/// # Examples
///
/// ```
/// use ventlink_lib::{Capabilities, Capability};
///
/// let caps = Capabilities::from_tags(["ExtendedAQ", "Heating"]);
/// assert!(caps.supports_heating());
/// assert!(!caps.supports_humidifier());
/// assert!(caps.contains(&Capability::ExtendedAq));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    tags: BTreeSet<Capability>,
}

impl Capabilities {
    /// Creates an empty capability set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from tag strings as delivered by the account layer.
    #[must_use]
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = tags
            .into_iter()
            .map(|tag| Capability::from(tag.as_ref()))
            .collect();
        Self { tags }
    }

    /// Returns a copy of this set with one more capability.
    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        self.tags.insert(capability);
        self
    }

    /// Returns `true` if the capability is declared.
    #[must_use]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.tags.contains(capability)
    }

    /// Iterates over the declared capabilities.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.tags.iter()
    }

    /// Returns the number of declared capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns whether the device has a heater.
    #[must_use]
    pub fn supports_heating(&self) -> bool {
        self.contains(&Capability::Heating)
    }

    /// Returns whether the device has a humidifier.
    #[must_use]
    pub fn supports_humidifier(&self) -> bool {
        self.contains(&Capability::Humidifier)
    }

    /// Returns whether the device reports extended air-quality data.
    #[must_use]
    pub fn supports_extended_aq(&self) -> bool {
        self.contains(&Capability::ExtendedAq)
    }

    /// Returns whether the device uses the second-generation angle fields.
    #[must_use]
    pub fn uses_day1_oscillation(&self) -> bool {
        self.contains(&Capability::AdvanceOscillationDay1)
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self {
            tags: iter.into_iter().collect(),
        }
    }
}

/// The field a firmware uses to switch the fan on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerControl {
    /// Not enough traffic observed yet.
    Unknown,
    /// `fpwr: ON|OFF` (newer firmware).
    Fpwr,
    /// `fmod: FAN|AUTO|OFF` (older firmware).
    Fmod,
}

impl PowerControl {
    /// Returns the state key used for power, or `None` when unknown.
    #[must_use]
    pub const fn key(&self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Fpwr => Some("fpwr"),
            Self::Fmod => Some("fmod"),
        }
    }
}

impl fmt::Display for PowerControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Fpwr => "fpwr",
            Self::Fmod => "fmod",
        })
    }
}

/// Counts which power fields appear in state traffic and derives a
/// best-guess [`PowerControl`].
///
/// The guess is only as good as the traffic seen: with fewer than
/// [`PowerControlDetector::CONFIDENT_AFTER`] state messages it may still
/// flip, which [`is_confident`](Self::is_confident) reports.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use ventlink_lib::{PowerControl, PowerControlDetector};
///
/// let detector = PowerControlDetector::new();
/// assert_eq!(detector.scheme(), PowerControl::Unknown);
///
/// let state = BTreeMap::from([("fpwr".to_string(), "ON".to_string())]);
/// detector.observe(&state);
/// assert_eq!(detector.scheme(), PowerControl::Fpwr);
/// ```
#[derive(Debug, Default)]
pub struct PowerControlDetector {
    messages: AtomicU64,
    fpwr_seen: AtomicU64,
    fmod_seen: AtomicU64,
    fnst_only: AtomicU64,
}

impl PowerControlDetector {
    /// Number of state messages after which the guess is considered stable.
    pub const CONFIDENT_AFTER: u64 = 3;

    /// Creates a detector with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the fields present in one `CURRENT-STATE` or `STATE-CHANGE`.
    pub fn observe(&self, fields: &StateMap) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        let has_fpwr = fields.contains_key("fpwr");
        let has_fmod = fields.contains_key("fmod");
        if has_fpwr {
            self.fpwr_seen.fetch_add(1, Ordering::Relaxed);
        }
        if has_fmod {
            self.fmod_seen.fetch_add(1, Ordering::Relaxed);
        }
        if !has_fpwr && !has_fmod && fields.contains_key("fnst") {
            self.fnst_only.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the current best guess.
    #[must_use]
    pub fn scheme(&self) -> PowerControl {
        let fpwr = self.fpwr_seen.load(Ordering::Relaxed);
        let fmod = self.fmod_seen.load(Ordering::Relaxed);
        match (fpwr, fmod) {
            (0, 0) => PowerControl::Unknown,
            (fpwr, fmod) if fpwr >= fmod => PowerControl::Fpwr,
            _ => PowerControl::Fmod,
        }
    }

    /// Returns `true` once enough state messages were observed.
    #[must_use]
    pub fn is_confident(&self) -> bool {
        self.messages.load(Ordering::Relaxed) >= Self::CONFIDENT_AFTER
    }

    /// Returns the number of state messages observed.
    #[must_use]
    pub fn messages_observed(&self) -> u64 {
        self.messages.load(Ordering::Relaxed)
    }

    /// Returns how many messages carried only `fnst` and no power field.
    #[must_use]
    pub fn fan_state_only(&self) -> u64 {
        self.fnst_only.load(Ordering::Relaxed)
    }

    /// Clears all counters, for a fresh connection.
    pub fn reset(&self) {
        self.messages.store(0, Ordering::Relaxed);
        self.fpwr_seen.store(0, Ordering::Relaxed);
        self.fmod_seen.store(0, Ordering::Relaxed);
        self.fnst_only.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(keys: &[&str]) -> StateMap {
        keys.iter()
            .map(|key| ((*key).to_string(), "ON".to_string()))
            .collect()
    }

    #[test]
    fn capability_tags_round_trip() {
        for tag in ["ExtendedAQ", "Heating", "Humidifier", "Scheduling", "Custom"] {
            let cap: Capability = tag.parse().unwrap();
            assert_eq!(cap.to_string(), tag);
        }
    }

    #[test]
    fn declared_set_queries() {
        let caps = Capabilities::new()
            .with(Capability::Humidifier)
            .with(Capability::AdvanceOscillationDay1);
        assert!(caps.supports_humidifier());
        assert!(caps.uses_day1_oscillation());
        assert!(!caps.supports_heating());
        assert_eq!(caps.len(), 2);
    }

    #[test]
    fn detector_starts_unknown() {
        let detector = PowerControlDetector::new();
        assert_eq!(detector.scheme(), PowerControl::Unknown);
        assert!(!detector.is_confident());
    }

    #[test]
    fn detector_prefers_fmod_when_fpwr_absent() {
        let detector = PowerControlDetector::new();
        detector.observe(&fields(&["fmod", "fnsp"]));
        detector.observe(&fields(&["fmod"]));
        detector.observe(&fields(&["fnst"]));
        assert_eq!(detector.scheme(), PowerControl::Fmod);
        assert!(detector.is_confident());
        assert_eq!(detector.fan_state_only(), 1);
    }

    #[test]
    fn detector_breaks_ties_towards_fpwr() {
        let detector = PowerControlDetector::new();
        detector.observe(&fields(&["fpwr", "fmod"]));
        assert_eq!(detector.scheme(), PowerControl::Fpwr);
    }

    #[test]
    fn fnst_alone_stays_unknown() {
        let detector = PowerControlDetector::new();
        detector.observe(&fields(&["fnst"]));
        assert_eq!(detector.scheme(), PowerControl::Unknown);
    }

    #[test]
    fn reset_clears_counters() {
        let detector = PowerControlDetector::new();
        detector.observe(&fields(&["fpwr"]));
        detector.reset();
        assert_eq!(detector.scheme(), PowerControl::Unknown);
        assert_eq!(detector.messages_observed(), 0);
    }
}
