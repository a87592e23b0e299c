// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Environmental sensor readings.

use super::{StateMap, parse_number};
use crate::types::kelvin_tenths_to_celsius;

/// Sentinels the firmware reports while a sensor is off or warming up.
const UNAVAILABLE: [&str; 3] = ["OFF", "INIT", "NONE"];

/// A copy of the latest `ENVIRONMENTAL-CURRENT-SENSOR-DATA` readings.
///
/// Raw values are kept as reported; scaling happens in the accessors.
///
/// # Examples
///
/// ```
/// use ventlink_lib::state::{EnvironmentalData, StateMap};
///
/// let data = EnvironmentalData::from_map(StateMap::from([
///     ("va10".to_string(), "0035".to_string()),
///     ("hchr".to_string(), "0002".to_string()),
///     ("tact".to_string(), "OFF".to_string()),
/// ]));
///
/// assert_eq!(data.voc(), Some(3.5));
/// assert_eq!(data.formaldehyde(), Some(0.002));
/// assert_eq!(data.temperature(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentalData {
    readings: StateMap,
}

impl EnvironmentalData {
    /// Wraps a raw reading map.
    #[must_use]
    pub fn from_map(readings: StateMap) -> Self {
        Self { readings }
    }

    /// Returns the raw reading for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.readings.get(key).map(String::as_str)
    }

    /// Returns `true` if no reading has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Borrows the raw map.
    #[must_use]
    pub fn as_map(&self) -> &StateMap {
        &self.readings
    }

    fn number(&self, key: &str) -> Option<u16> {
        let raw = self.get(key)?;
        if UNAVAILABLE.contains(&raw) {
            return None;
        }
        parse_number(raw)
    }

    /// PM2.5 concentration in µg/m³.
    #[must_use]
    pub fn pm25(&self) -> Option<u16> {
        self.number("pm25").or_else(|| self.number("p25r"))
    }

    /// PM10 concentration in µg/m³.
    #[must_use]
    pub fn pm10(&self) -> Option<u16> {
        self.number("pm10").or_else(|| self.number("p10r"))
    }

    /// Particulate index reported by older purifiers.
    #[must_use]
    pub fn particulates(&self) -> Option<u16> {
        self.number("pact")
    }

    /// Volatile organic compounds index.
    #[must_use]
    pub fn voc(&self) -> Option<f64> {
        self.number("va10")
            .map(|raw| f64::from(raw) / 10.0)
            .or_else(|| self.number("vact").map(f64::from))
    }

    /// Nitrogen dioxide index.
    #[must_use]
    pub fn no2(&self) -> Option<f64> {
        self.number("noxl").map(|raw| f64::from(raw) / 10.0)
    }

    /// Formaldehyde concentration in mg/m³.
    #[must_use]
    pub fn formaldehyde(&self) -> Option<f64> {
        self.number("hchr").map(|raw| f64::from(raw) / 1000.0)
    }

    /// Temperature in °C.
    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.number("tact").map(kelvin_tenths_to_celsius)
    }

    /// Relative humidity in %.
    #[must_use]
    pub fn humidity(&self) -> Option<u16> {
        self.number("hact").or_else(|| self.number("humi"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> EnvironmentalData {
        EnvironmentalData::from_map(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn particulate_readings() {
        let d = data(&[("pm25", "0012"), ("p10r", "0020")]);
        assert_eq!(d.pm25(), Some(12));
        assert_eq!(d.pm10(), Some(20));
    }

    #[test]
    fn scaled_readings() {
        let d = data(&[("va10", "0042"), ("noxl", "0015"), ("hchr", "0125")]);
        assert_eq!(d.voc(), Some(4.2));
        assert_eq!(d.no2(), Some(1.5));
        assert_eq!(d.formaldehyde(), Some(0.125));
    }

    #[test]
    fn temperature_is_converted_from_kelvin_tenths() {
        let d = data(&[("tact", "2982")]);
        let celsius = d.temperature().unwrap();
        assert!((celsius - 25.05).abs() < 1e-9);
    }

    #[test]
    fn sentinels_read_as_none() {
        let d = data(&[("tact", "OFF"), ("hact", "INIT"), ("pm25", "garbage")]);
        assert_eq!(d.temperature(), None);
        assert_eq!(d.humidity(), None);
        assert_eq!(d.pm25(), None);
    }

    #[test]
    fn humidity_falls_back_to_humi() {
        let d = data(&[("humi", "0045")]);
        assert_eq!(d.humidity(), Some(45));
    }
}
