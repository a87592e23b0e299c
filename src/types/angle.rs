// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Oscillation angle values.

use std::fmt;

use crate::error::ValueError;

/// A single oscillation angle in degrees (0-359).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OscillationAngle(u16);

impl OscillationAngle {
    /// Largest valid angle.
    pub const MAX: u16 = 359;

    /// Creates an angle.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `degrees` is greater than 359.
    pub fn new(degrees: u16) -> Result<Self, ValueError> {
        if degrees > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: i32::from(Self::MAX),
                actual: i32::from(degrees),
            });
        }
        Ok(Self(degrees))
    }

    /// Returns the angle in degrees.
    #[must_use]
    pub const fn degrees(&self) -> u16 {
        self.0
    }

    /// Encodes the angle as a zero-padded wire value.
    #[must_use]
    pub fn encode(&self) -> String {
        super::encode_number(self.0)
    }
}

impl fmt::Display for OscillationAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Lower and upper oscillation bounds.
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::OscillationRange;
///
/// let range = OscillationRange::new(45, 315).unwrap();
/// assert_eq!(range.span(), 270);
/// assert!(OscillationRange::new(300, 20).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OscillationRange {
    low: OscillationAngle,
    high: OscillationAngle,
}

impl OscillationRange {
    /// Creates a range from two angles in degrees.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if either angle exceeds 359 or if
    /// `high` is below `low`.
    pub fn new(low: u16, high: u16) -> Result<Self, ValueError> {
        let low = OscillationAngle::new(low)?;
        let high = OscillationAngle::new(high)?;
        if high < low {
            return Err(ValueError::OutOfRange {
                min: i32::from(low.degrees()),
                max: i32::from(OscillationAngle::MAX),
                actual: i32::from(high.degrees()),
            });
        }
        Ok(Self { low, high })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn low(&self) -> OscillationAngle {
        self.low
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn high(&self) -> OscillationAngle {
        self.high
    }

    /// Returns the swept angle in degrees.
    #[must_use]
    pub const fn span(&self) -> u16 {
        self.high.0 - self.low.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_bounds() {
        assert!(OscillationAngle::new(0).is_ok());
        assert!(OscillationAngle::new(359).is_ok());
        assert!(OscillationAngle::new(360).is_err());
    }

    #[test]
    fn range_encoding() {
        let range = OscillationRange::new(5, 355).unwrap();
        assert_eq!(range.low().encode(), "0005");
        assert_eq!(range.high().encode(), "0355");
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(OscillationRange::new(200, 100).is_err());
    }
}
