// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device state.
//!
//! The device reports its configuration as a flat map of short opaque keys
//! (`fpwr`, `fnsp`, `hflr`, ...) to string values. The [`StateStore`] keeps the
//! last-known map and the latest environmental readings; callers only ever see
//! copies ([`DeviceState`], [`EnvironmentalData`]).
//!
//! Values are never stored pre-parsed. Interpretation lives in the read-only
//! accessor traits ([`FanState`], [`HeaterState`], [`HumidifierState`],
//! [`RobotVacuumState`]), which all funnel through [`get_value`].
//!
//! # Examples
//!
//! ```
//! use ventlink_lib::state::{FanState, StateMap, StateStore};
//! use ventlink_lib::types::{FanSpeed, PowerState};
//!
//! let store = StateStore::new();
//! store.apply_full_state(StateMap::from([
//!     ("fpwr".to_string(), "ON".to_string()),
//!     ("fnsp".to_string(), "0006".to_string()),
//! ]));
//! store.apply_delta(StateMap::from([("nmod".to_string(), "ON".to_string())]));
//!
//! let state = store.snapshot();
//! assert_eq!(state.power(), Some(PowerState::On));
//! assert_eq!(state.fan_speed(), Some(FanSpeed::new(6).unwrap()));
//! assert_eq!(state.night_mode(), Some(true));
//! ```

mod device_state;
mod environment;
mod fan;
mod heater;
mod humidifier;
mod store;
mod vacuum;

use std::collections::BTreeMap;

pub use device_state::{DeviceState, get_value};
pub use environment::EnvironmentalData;
pub use fan::FanState;
pub use heater::HeaterState;
pub use humidifier::HumidifierState;
pub use store::StateStore;
pub use vacuum::{RobotStatus, RobotVacuumState, VacuumActivity};

/// Raw key/value map as reported by the device.
pub type StateMap = BTreeMap<String, String>;

/// Parses a zero-padded decimal setting (`"0006"` -> 6).
pub(crate) fn parse_number(value: &str) -> Option<u16> {
    value.trim().parse().ok()
}

/// Parses an `ON`/`OFF` switch. Anything else is unknown.
pub(crate) fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "ON" => Some(true),
        "OFF" => Some(false),
        _ => None,
    }
}
