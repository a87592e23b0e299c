// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed values.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// A fixed fan level, always within 1..=10.
///
/// Only obtainable through [`FanSpeed::new`], [`FanSpeed::from_level`] or
/// parsing, so an out-of-range level cannot be encoded.
///
/// ```compile_fail
/// use ventlink_lib::types::{FanLevel, FanSpeed};
///
/// let speed = FanSpeed::Level(FanLevel(15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FanLevel(u8);

impl FanLevel {
    /// Returns the level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Fan speed: a level from 1 to 10 or the firmware-managed `AUTO` sentinel.
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::FanSpeed;
///
/// let speed = FanSpeed::new(6).unwrap();
/// assert_eq!(speed.encode(), "0006");
/// assert_eq!(FanSpeed::Auto.encode(), "AUTO");
///
/// assert!(FanSpeed::new(15).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanSpeed {
    /// A fixed level (1-10).
    Level(FanLevel),
    /// Speed chosen by the device.
    Auto,
}

impl FanSpeed {
    /// Lowest fan level.
    pub const MIN: u8 = 1;

    /// Highest fan level.
    pub const MAX: u8 = 10;

    /// Wire token for automatic speed.
    pub const AUTO_TOKEN: &'static str = "AUTO";

    /// Creates a fixed fan level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `level` is outside [1, 10].
    pub fn new(level: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(ValueError::OutOfRange {
                min: i32::from(Self::MIN),
                max: i32::from(Self::MAX),
                actual: i32::from(level),
            });
        }
        Ok(Self::Level(FanLevel(level)))
    }

    /// Creates a fan speed from any integer, rejecting everything outside
    /// [1, 10].
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `level` is outside [1, 10].
    pub fn from_level(level: i64) -> Result<Self, ValueError> {
        u8::try_from(level)
            .map_err(|_| ValueError::OutOfRange {
                min: i32::from(Self::MIN),
                max: i32::from(Self::MAX),
                actual: i32::try_from(level).unwrap_or(i32::MAX),
            })
            .and_then(Self::new)
    }

    /// Returns the level, or `None` for [`FanSpeed::Auto`].
    #[must_use]
    pub const fn level(&self) -> Option<u8> {
        match self {
            Self::Level(level) => Some(level.get()),
            Self::Auto => None,
        }
    }

    /// Encodes the speed as the `fnsp` wire value.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Level(level) => super::encode_number(u16::from(level.get())),
            Self::Auto => Self::AUTO_TOKEN.to_string(),
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{}", level.get()),
            Self::Auto => f.write_str(Self::AUTO_TOKEN),
        }
    }
}

impl FromStr for FanSpeed {
    type Err = ValueError;

    /// Parses either the `AUTO` sentinel or a (possibly zero-padded) level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(Self::AUTO_TOKEN) {
            return Ok(Self::Auto);
        }
        let level: i64 = trimmed
            .parse()
            .map_err(|_| ValueError::InvalidFanSpeed(s.to_string()))?;
        Self::from_level(level)
    }
}
