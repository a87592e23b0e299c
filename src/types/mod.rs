// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device control.
//!
//! This module provides type-safe representations of the values carried in
//! `STATE-SET` commands. Each type checks its range at construction time so a
//! command can never be published with a value the firmware would silently
//! ignore (there is no acknowledgement channel to detect that).
//!
//! # Types
//!
//! - [`PowerState`] - `ON`/`OFF` switches
//! - [`FanSpeed`] - Fan level (1-10) or the `AUTO` sentinel
//! - [`OscillationAngle`] / [`OscillationRange`] - Oscillation angles (0-359)
//! - [`SleepTimer`] - Sleep timer in minutes (15-540)
//! - [`TargetTemperature`] - Heating target in °C (1-37)
//! - [`TargetHumidity`] - Humidifier target in % (30-70, steps of 10)
//! - [`WaterHardness`] - Water hardness used for descaling schedules
//! - [`FanDirection`] - Front or back airflow

mod angle;
mod climate;
mod power;
mod speed;
mod timer;

pub use angle::{OscillationAngle, OscillationRange};
pub use climate::{
    FanDirection, TargetHumidity, TargetTemperature, WaterHardness, celsius_to_kelvin_tenths,
    kelvin_tenths_to_celsius,
};
pub use power::PowerState;
pub use speed::{FanLevel, FanSpeed};
pub use timer::SleepTimer;

/// Encodes a numeric setting the way the firmware expects it: four
/// zero-padded digits.
///
/// # Examples
///
/// ```
/// assert_eq!(ventlink_lib::types::encode_number(6), "0006");
/// assert_eq!(ventlink_lib::types::encode_number(2950), "2950");
/// ```
#[must_use]
pub fn encode_number(value: u16) -> String {
    format!("{value:04}")
}
