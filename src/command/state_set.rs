// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `STATE-SET` settings commands.

use serde_json::{Map, Value};

use super::Command;
use crate::capabilities::PowerControl;
use crate::types::{
    FanDirection, FanSpeed, OscillationRange, PowerState, SleepTimer, TargetHumidity,
    TargetTemperature, WaterHardness,
};

/// Value written to a filter-life key to mark a fresh filter.
const FILTER_RESET_VALUE: &str = "0100";

/// Which filter to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// HEPA filter (`hflr`).
    Hepa,
    /// Carbon filter (`cflr`).
    Carbon,
}

impl FilterKind {
    /// Returns the state key of the filter.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Hepa => "hflr",
            Self::Carbon => "cflr",
        }
    }
}

/// A `STATE-SET` command carrying settings in its `data` object.
///
/// # Examples
///
/// ```
/// use ventlink_lib::command::{Command, StateSet};
///
/// let cmd = StateSet::new().set("nmod", "ON").set("rhtm", "OFF");
/// let data = cmd.data().unwrap();
/// assert_eq!(data["nmod"], "ON");
/// assert_eq!(data["rhtm"], "OFF");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSet {
    fields: Map<String, Value>,
}

impl StateSet {
    /// Creates an empty command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one setting.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Returns `true` if no setting was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn switch(key: &str, on: bool) -> Self {
        Self::new().set(key, PowerState::from(on).as_str())
    }

    /// Switches the fan on or off using the field the firmware expects.
    ///
    /// `fmod` firmware takes `FAN`/`OFF`; everything else, including a scheme
    /// not yet detected, takes `fpwr: ON|OFF`.
    #[must_use]
    pub fn power(state: PowerState, scheme: PowerControl) -> Self {
        match scheme {
            PowerControl::Fmod => Self::new().set("fmod", if state.is_on() { "FAN" } else { "OFF" }),
            PowerControl::Fpwr | PowerControl::Unknown => Self::new().set("fpwr", state.as_str()),
        }
    }

    /// Sets the fan speed, switching the fan on.
    ///
    /// `FanSpeed::Auto` enables automatic mode instead.
    #[must_use]
    pub fn fan_speed(speed: FanSpeed, scheme: PowerControl) -> Self {
        match speed {
            FanSpeed::Auto => Self::auto_mode(true, scheme),
            FanSpeed::Level(_) => Self::power(PowerState::On, scheme).set("fnsp", speed.encode()),
        }
    }

    /// Enables or disables automatic mode.
    #[must_use]
    pub fn auto_mode(enabled: bool, scheme: PowerControl) -> Self {
        match scheme {
            PowerControl::Fmod => Self::new().set("fmod", if enabled { "AUTO" } else { "FAN" }),
            PowerControl::Fpwr | PowerControl::Unknown => Self::switch("auto", enabled),
        }
    }

    /// Enables or disables night mode.
    #[must_use]
    pub fn night_mode(enabled: bool) -> Self {
        Self::switch("nmod", enabled)
    }

    /// Enables or disables continuous monitoring while off.
    #[must_use]
    pub fn continuous_monitoring(enabled: bool) -> Self {
        Self::switch("rhtm", enabled)
    }

    /// Enables or disables oscillation, optionally with an explicit sweep.
    ///
    /// `day1` selects the newer angle-control generation, which also needs
    /// `ancp: CUST` for a custom sweep.
    #[must_use]
    pub fn oscillation(enabled: bool, range: Option<OscillationRange>, day1: bool) -> Self {
        match (enabled, range) {
            (true, Some(range)) => Self::oscillation_range(range, day1),
            _ => Self::switch("oson", enabled),
        }
    }

    /// Sets the oscillation sweep and enables oscillation.
    #[must_use]
    pub fn oscillation_range(range: OscillationRange, day1: bool) -> Self {
        let cmd = Self::new()
            .set("oson", "ON")
            .set("osal", range.low().encode())
            .set("osau", range.high().encode());
        if day1 { cmd.set("ancp", "CUST") } else { cmd }
    }

    /// Sets or clears the sleep timer.
    #[must_use]
    pub fn sleep_timer(timer: Option<SleepTimer>) -> Self {
        match timer {
            Some(timer) => Self::new().set("sltm", timer.encode()),
            None => Self::new().set("sltm", SleepTimer::OFF_TOKEN),
        }
    }

    /// Enables or disables heating.
    #[must_use]
    pub fn heat_mode(enabled: bool) -> Self {
        Self::new().set("hmod", if enabled { "HEAT" } else { "OFF" })
    }

    /// Sets the heating target and enables heating.
    #[must_use]
    pub fn target_temperature(target: TargetTemperature) -> Self {
        Self::heat_mode(true).set("hmax", target.encode())
    }

    /// Enables or disables humidification.
    #[must_use]
    pub fn humidifier(enabled: bool) -> Self {
        Self::new().set("hume", if enabled { "HUMD" } else { "OFF" })
    }

    /// Enables or disables the automatic humidity target.
    #[must_use]
    pub fn humidifier_auto(enabled: bool) -> Self {
        Self::switch("haut", enabled)
    }

    /// Sets a manual humidity target, leaving automatic mode.
    #[must_use]
    pub fn target_humidity(target: TargetHumidity) -> Self {
        Self::new().set("haut", "OFF").set("humt", target.encode())
    }

    /// Sets the water hardness.
    #[must_use]
    pub fn water_hardness(hardness: WaterHardness) -> Self {
        Self::new().set("wath", hardness.as_str())
    }

    /// Sets the airflow direction.
    #[must_use]
    pub fn fan_direction(direction: FanDirection) -> Self {
        Self::new().set("fdir", direction.as_str())
    }

    /// Marks a filter as freshly replaced.
    #[must_use]
    pub fn reset_filter(filter: FilterKind) -> Self {
        Self::new().set(filter.key(), FILTER_RESET_VALUE)
    }

    /// Enables or disables automatic firmware updates.
    #[must_use]
    pub fn firmware_auto_update(enabled: bool) -> Self {
        Self::switch("fdax", enabled)
    }
}

impl Command for StateSet {
    fn msg(&self) -> &str {
        "STATE-SET"
    }

    fn data(&self) -> Option<Map<String, Value>> {
        Some(self.fields.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(cmd: &StateSet) -> Map<String, Value> {
        cmd.data().unwrap()
    }

    #[test]
    fn power_follows_scheme() {
        let fpwr = StateSet::power(PowerState::Off, PowerControl::Fpwr);
        assert_eq!(data(&fpwr)["fpwr"], "OFF");

        let fmod = StateSet::power(PowerState::On, PowerControl::Fmod);
        assert_eq!(data(&fmod)["fmod"], "FAN");
        assert!(!data(&fmod).contains_key("fpwr"));

        let unknown = StateSet::power(PowerState::On, PowerControl::Unknown);
        assert_eq!(data(&unknown)["fpwr"], "ON");
    }

    #[test]
    fn fan_speed_six_is_padded() {
        let cmd = StateSet::fan_speed(FanSpeed::new(6).unwrap(), PowerControl::Fpwr);
        assert_eq!(data(&cmd)["fnsp"], "0006");
    }

    #[test]
    fn fan_speed_only_encodes_levels_one_to_ten() {
        for level in [0_i64, 11, 15, -1] {
            assert!(FanSpeed::from_level(level).is_err(), "{level}");
        }
        assert!("0015".parse::<FanSpeed>().is_err());

        let encoded: Vec<String> = (1..=10)
            .map(|level| {
                let cmd = StateSet::fan_speed(FanSpeed::new(level).unwrap(), PowerControl::Fpwr);
                data(&cmd)["fnsp"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(encoded.first().map(String::as_str), Some("0001"));
        assert_eq!(encoded.last().map(String::as_str), Some("0010"));
    }

    #[test]
    fn fan_speed_auto_enables_auto_mode() {
        let cmd = StateSet::fan_speed(FanSpeed::Auto, PowerControl::Fpwr);
        assert_eq!(data(&cmd)["auto"], "ON");
        let cmd = StateSet::fan_speed(FanSpeed::Auto, PowerControl::Fmod);
        assert_eq!(data(&cmd)["fmod"], "AUTO");
    }

    #[test]
    fn oscillation_variants() {
        let range = OscillationRange::new(45, 315).unwrap();

        let day0 = StateSet::oscillation_range(range, false);
        assert_eq!(data(&day0)["osal"], "0045");
        assert_eq!(data(&day0)["osau"], "0315");
        assert!(!data(&day0).contains_key("ancp"));

        let day1 = StateSet::oscillation_range(range, true);
        assert_eq!(data(&day1)["ancp"], "CUST");

        let off = StateSet::oscillation(false, Some(range), false);
        assert_eq!(data(&off).len(), 1);
        assert_eq!(data(&off)["oson"], "OFF");
    }

    #[test]
    fn humidity_target_leaves_auto() {
        let cmd = StateSet::target_humidity(TargetHumidity::new(44));
        assert_eq!(data(&cmd)["haut"], "OFF");
        assert_eq!(data(&cmd)["humt"], "0040");
    }

    #[test]
    fn heating_target() {
        let cmd = StateSet::target_temperature(TargetTemperature::new(20.0).unwrap());
        assert_eq!(data(&cmd)["hmod"], "HEAT");
        assert_eq!(data(&cmd)["hmax"], "2932");
    }

    #[test]
    fn sleep_timer_off_and_on() {
        assert_eq!(data(&StateSet::sleep_timer(None))["sltm"], "OFF");
        let timer = SleepTimer::new(60).unwrap();
        assert_eq!(data(&StateSet::sleep_timer(Some(timer)))["sltm"], "0060");
    }

    #[test]
    fn filter_resets_are_independent() {
        let hepa = StateSet::reset_filter(FilterKind::Hepa);
        assert_eq!(data(&hepa)["hflr"], "0100");
        assert!(!data(&hepa).contains_key("cflr"));
        assert_eq!(data(&StateSet::reset_filter(FilterKind::Carbon))["cflr"], "0100");
    }

    #[test]
    fn misc_switches() {
        assert_eq!(data(&StateSet::water_hardness(WaterHardness::Soft))["wath"], "2025");
        assert_eq!(data(&StateSet::fan_direction(FanDirection::Back))["fdir"], "OFF");
        assert_eq!(data(&StateSet::firmware_auto_update(true))["fdax"], "ON");
        assert_eq!(data(&StateSet::humidifier(true))["hume"], "HUMD");
    }
}
