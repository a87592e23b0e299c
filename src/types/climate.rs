// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heating, humidifier and airflow values.
//!
//! Temperatures travel as Kelvin × 10 (`"2950"` is 295.0 K, about 21.9 °C).

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Offset between Kelvin and Celsius.
const KELVIN_OFFSET: f64 = 273.15;

/// Offset between Kelvin × 10 and Celsius × 10, rounded half up.
const KELVIN_TENTHS_OFFSET: f64 = 2732.0;

/// Converts a Kelvin × 10 reading to degrees Celsius.
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::kelvin_tenths_to_celsius;
///
/// let celsius = kelvin_tenths_to_celsius(2950);
/// assert!((celsius - 21.85).abs() < 1e-9);
/// ```
#[must_use]
pub fn kelvin_tenths_to_celsius(raw: u16) -> f64 {
    f64::from(raw) / 10.0 - KELVIN_OFFSET
}

/// Converts degrees Celsius to the Kelvin × 10 wire representation.
///
/// Values that would not fit the wire format saturate at the `u16` bounds.
#[must_use]
pub fn celsius_to_kelvin_tenths(celsius: f64) -> u16 {
    let tenths = (celsius * 10.0).round() + KELVIN_TENTHS_OFFSET;
    // Saturated explicitly above, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let value = tenths.clamp(0.0, f64::from(u16::MAX)) as u16;
    value
}

/// Heating target temperature in degrees Celsius (1-37).
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::TargetTemperature;
///
/// let target = TargetTemperature::new(20.0).unwrap();
/// assert_eq!(target.encode(), "2932");
/// assert!(TargetTemperature::new(40.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TargetTemperature(f64);

impl TargetTemperature {
    /// Lowest accepted target.
    pub const MIN_CELSIUS: f64 = 1.0;

    /// Highest accepted target.
    pub const MAX_CELSIUS: f64 = 37.0;

    /// Creates a target temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `celsius` is outside [1, 37] or
    /// not a finite number.
    pub fn new(celsius: f64) -> Result<Self, ValueError> {
        if !celsius.is_finite() || !(Self::MIN_CELSIUS..=Self::MAX_CELSIUS).contains(&celsius) {
            // Display-only integer, truncation is fine.
            #[allow(clippy::cast_possible_truncation)]
            let actual = if celsius.is_finite() { celsius as i32 } else { i32::MAX };
            return Err(ValueError::OutOfRange {
                min: 1,
                max: 37,
                actual,
            });
        }
        Ok(Self(celsius))
    }

    /// Returns the target in degrees Celsius.
    #[must_use]
    pub const fn celsius(&self) -> f64 {
        self.0
    }

    /// Encodes the target as the `hmax` wire value.
    #[must_use]
    pub fn encode(&self) -> String {
        super::encode_number(celsius_to_kelvin_tenths(self.0))
    }
}

/// Humidifier target humidity (30-70 %, in steps of 10).
///
/// Out-of-range requests are clamped rather than rejected, and in-between
/// values snap to the nearest step.
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::TargetHumidity;
///
/// assert_eq!(TargetHumidity::new(44).percent(), 40);
/// assert_eq!(TargetHumidity::new(71).percent(), 70);
/// assert_eq!(TargetHumidity::new(29).encode(), "0030");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetHumidity(u8);

impl TargetHumidity {
    /// Lowest target.
    pub const MIN: u8 = 30;

    /// Highest target.
    pub const MAX: u8 = 70;

    /// Step between accepted targets.
    pub const STEP: u8 = 10;

    /// Creates a target, rounding to the nearest step and clamping to [30, 70].
    #[must_use]
    pub fn new(percent: u16) -> Self {
        let step = u16::from(Self::STEP);
        let rounded = (percent.saturating_add(step / 2) / step) * step;
        let clamped = rounded.clamp(u16::from(Self::MIN), u16::from(Self::MAX));
        // Clamped to [30, 70] above.
        #[allow(clippy::cast_possible_truncation)]
        Self(clamped as u8)
    }

    /// Returns the target in percent.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.0
    }

    /// Encodes the target as the `humt` wire value.
    #[must_use]
    pub fn encode(&self) -> String {
        super::encode_number(u16::from(self.0))
    }
}

/// Water hardness setting used by humidifiers to schedule deep cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterHardness {
    /// Soft water.
    Soft,
    /// Medium hardness.
    Medium,
    /// Hard water.
    Hard,
}

impl WaterHardness {
    /// Returns the `wath` wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "2025",
            Self::Medium => "1350",
            Self::Hard => "0675",
        }
    }
}

impl fmt::Display for WaterHardness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Soft => "soft",
            Self::Medium => "medium",
            Self::Hard => "hard",
        })
    }
}

impl FromStr for WaterHardness {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "2025" | "soft" => Ok(Self::Soft),
            "1350" | "medium" => Ok(Self::Medium),
            "0675" | "675" | "hard" => Ok(Self::Hard),
            _ => Err(ValueError::InvalidToken {
                kind: "water hardness",
                token: s.to_string(),
            }),
        }
    }
}

/// Airflow direction for fans that can blow backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanDirection {
    /// Air leaves through the front.
    Front,
    /// Air leaves through the back.
    Back,
}

impl FanDirection {
    /// Returns the `fdir` wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "ON",
            Self::Back => "OFF",
        }
    }
}

impl FromStr for FanDirection {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ON" | "FRONT" => Ok(Self::Front),
            "OFF" | "BACK" => Ok(Self::Back),
            _ => Err(ValueError::InvalidToken {
                kind: "fan direction",
                token: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humidity_snaps_and_clamps() {
        let resolved: Vec<u8> = [29, 31, 44, 71]
            .into_iter()
            .map(|h| TargetHumidity::new(h).percent())
            .collect();
        assert_eq!(resolved, vec![30, 30, 40, 70]);
    }

    #[test]
    fn humidity_extremes() {
        assert_eq!(TargetHumidity::new(0).percent(), 30);
        assert_eq!(TargetHumidity::new(u16::MAX).percent(), 70);
        assert_eq!(TargetHumidity::new(55).percent(), 60);
    }

    #[test]
    fn kelvin_round_trip_is_close() {
        let raw = celsius_to_kelvin_tenths(20.0);
        assert_eq!(raw, 2932);
        assert!((kelvin_tenths_to_celsius(raw) - 20.0).abs() < 0.1);
    }

    #[test]
    fn temperature_bounds() {
        assert!(TargetTemperature::new(1.0).is_ok());
        assert!(TargetTemperature::new(37.0).is_ok());
        assert!(TargetTemperature::new(0.5).is_err());
        assert!(TargetTemperature::new(f64::NAN).is_err());
    }

    #[test]
    fn water_hardness_tokens() {
        assert_eq!(WaterHardness::Hard.as_str(), "0675");
        assert_eq!("1350".parse::<WaterHardness>().unwrap(), WaterHardness::Medium);
    }

    #[test]
    fn fan_direction_tokens() {
        assert_eq!("ON".parse::<FanDirection>().unwrap(), FanDirection::Front);
        assert_eq!(FanDirection::Back.as_str(), "OFF");
    }
}
