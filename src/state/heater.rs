// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater accessors.

use super::{DeviceState, parse_number};
use crate::types::kelvin_tenths_to_celsius;

/// Typed read access to the heating fields of a [`DeviceState`].
pub trait HeaterState {
    /// Heating enabled (`hmod` is `HEAT`).
    fn heat_mode(&self) -> Option<bool>;

    /// Target temperature in °C (`hmax`).
    fn target_temperature(&self) -> Option<f64>;

    /// Whether the tilt switch cut the heater (`tilt`).
    fn tilted(&self) -> Option<bool>;
}

impl HeaterState for DeviceState {
    fn heat_mode(&self) -> Option<bool> {
        match self.get("hmod")? {
            "HEAT" => Some(true),
            "OFF" => Some(false),
            _ => None,
        }
    }

    fn target_temperature(&self) -> Option<f64> {
        parse_number(self.get("hmax")?).map(kelvin_tenths_to_celsius)
    }

    fn tilted(&self) -> Option<bool> {
        match self.get("tilt")? {
            "TILT" => Some(true),
            "OK" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateMap;

    #[test]
    fn heating_fields() {
        let state = DeviceState::from_map(StateMap::from([
            ("hmod".to_string(), "HEAT".to_string()),
            ("hmax".to_string(), "2932".to_string()),
            ("tilt".to_string(), "OK".to_string()),
        ]));

        assert_eq!(state.heat_mode(), Some(true));
        assert!((state.target_temperature().unwrap() - 20.05).abs() < 1e-9);
        assert_eq!(state.tilted(), Some(false));
    }

    #[test]
    fn missing_heating_fields() {
        let state = DeviceState::new();
        assert_eq!(state.heat_mode(), None);
        assert_eq!(state.target_temperature(), None);
    }
}
