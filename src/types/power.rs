// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off switch values.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// An `ON`/`OFF` switch as encoded in product state.
///
/// # Examples
///
/// ```
/// use ventlink_lib::types::PowerState;
///
/// assert_eq!(PowerState::On.as_str(), "ON");
/// assert_eq!("off".parse::<PowerState>().unwrap(), PowerState::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// Switched off.
    Off,
    /// Switched on.
    On,
}

impl PowerState {
    /// Returns the wire token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns `true` for [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OFF" | "FALSE" => Ok(Self::Off),
            "ON" | "TRUE" => Ok(Self::On),
            _ => Err(ValueError::InvalidToken {
                kind: "power state",
                token: s.to_string(),
            }),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("On".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("OFF".parse::<PowerState>().unwrap(), PowerState::Off);
    }

    #[test]
    fn parse_rejects_other_tokens() {
        assert!("FAN".parse::<PowerState>().is_err());
    }

    #[test]
    fn from_bool() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert!(!PowerState::from(false).is_on());
    }
}
