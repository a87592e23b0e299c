// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sleep timer values.

use std::fmt;
use std::time::Duration;

use crate::error::ValueError;

/// Sleep timer in minutes (15-540 inclusive).
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::SleepTimer;
///
/// let timer = SleepTimer::new(90).unwrap();
/// assert_eq!(timer.encode(), "0090");
/// assert!(SleepTimer::new(10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SleepTimer(u16);

impl SleepTimer {
    /// Shortest timer in minutes.
    pub const MIN: u16 = 15;

    /// Longest timer in minutes.
    pub const MAX: u16 = 540;

    /// Wire token for a disabled timer.
    pub const OFF_TOKEN: &'static str = "OFF";

    /// Creates a sleep timer.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `minutes` is outside [15, 540].
    pub fn new(minutes: u16) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&minutes) {
            return Err(ValueError::OutOfRange {
                min: i32::from(Self::MIN),
                max: i32::from(Self::MAX),
                actual: i32::from(minutes),
            });
        }
        Ok(Self(minutes))
    }

    /// Returns the timer length in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u16 {
        self.0
    }

    /// Returns the timer length as a [`Duration`].
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }

    /// Encodes the timer as the `sltm` wire value.
    #[must_use]
    pub fn encode(&self) -> String {
        super::encode_number(self.0)
    }
}

impl fmt::Display for SleepTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert!(SleepTimer::new(15).is_ok());
        assert!(SleepTimer::new(540).is_ok());
        assert!(SleepTimer::new(14).is_err());
        assert!(SleepTimer::new(541).is_err());
    }

    #[test]
    fn duration_in_seconds() {
        let timer = SleepTimer::new(15).unwrap();
        assert_eq!(timer.as_duration(), Duration::from_secs(900));
    }
}
