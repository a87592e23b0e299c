// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan and purifier accessors.

use super::{DeviceState, parse_number, parse_switch};
use crate::types::{FanDirection, FanSpeed, OscillationRange, PowerState};

/// Typed read access to the fan/purifier fields of a [`DeviceState`].
///
/// Every accessor returns `None` when the key is absent or malformed.
pub trait FanState {
    /// Power state, from `fpwr` or (older firmware) `fmod`.
    fn power(&self) -> Option<PowerState>;

    /// Fan speed (`fnsp`).
    fn fan_speed(&self) -> Option<FanSpeed>;

    /// Whether the device controls its own speed (`auto`, `fmod` or `fnsp`).
    fn auto_mode(&self) -> Option<bool>;

    /// Whether the fan is actually spinning (`fnst`).
    fn fan_running(&self) -> Option<bool>;

    /// Night mode (`nmod`).
    fn night_mode(&self) -> Option<bool>;

    /// Oscillation (`oson`).
    fn oscillation(&self) -> Option<bool>;

    /// Oscillation sweep (`osal`/`osau`).
    fn oscillation_range(&self) -> Option<OscillationRange>;

    /// Continuous monitoring while off (`rhtm`).
    fn continuous_monitoring(&self) -> Option<bool>;

    /// Remaining sleep timer in minutes (`sltm`); `None` when off.
    fn sleep_timer(&self) -> Option<u16>;

    /// Airflow direction (`fdir`).
    fn fan_direction(&self) -> Option<FanDirection>;

    /// HEPA filter life in percent (`hflr`), always within [0, 100].
    fn hepa_filter_life(&self) -> Option<u8>;

    /// Carbon filter life in percent (`cflr`), always within [0, 100].
    fn carbon_filter_life(&self) -> Option<u8>;

    /// Remaining filter hours on older purifiers (`filf`).
    fn filter_hours(&self) -> Option<u16>;

    /// Active error code (`ercd`).
    fn error_code(&self) -> Option<&str>;

    /// Active warning code (`wacd`).
    fn warning_code(&self) -> Option<&str>;

    /// Automatic firmware updates (`fdax`).
    fn firmware_auto_update(&self) -> Option<bool>;
}

fn filter_life(raw: &str) -> Option<u8> {
    let value = parse_number(raw)?;
    // Clamped to [0, 100].
    #[allow(clippy::cast_possible_truncation)]
    Some(value.min(100) as u8)
}

impl FanState for DeviceState {
    fn power(&self) -> Option<PowerState> {
        if let Some(fpwr) = self.get("fpwr") {
            return parse_switch(fpwr).map(PowerState::from);
        }
        match self.get("fmod")? {
            "OFF" => Some(PowerState::Off),
            "FAN" | "AUTO" => Some(PowerState::On),
            _ => None,
        }
    }

    fn fan_speed(&self) -> Option<FanSpeed> {
        self.get("fnsp")?.parse().ok()
    }

    fn auto_mode(&self) -> Option<bool> {
        if let Some(auto) = self.get("auto") {
            return parse_switch(auto);
        }
        if let Some(fmod) = self.get("fmod") {
            return Some(fmod == "AUTO");
        }
        self.get("fnsp").map(|fnsp| fnsp == FanSpeed::AUTO_TOKEN)
    }

    fn fan_running(&self) -> Option<bool> {
        match self.get("fnst")? {
            "FAN" => Some(true),
            "OFF" => Some(false),
            _ => None,
        }
    }

    fn night_mode(&self) -> Option<bool> {
        parse_switch(self.get("nmod")?)
    }

    fn oscillation(&self) -> Option<bool> {
        match self.get("oson")? {
            "ON" | "OION" => Some(true),
            "OFF" | "OIOF" => Some(false),
            _ => None,
        }
    }

    fn oscillation_range(&self) -> Option<OscillationRange> {
        let low = parse_number(self.get("osal")?)?;
        let high = parse_number(self.get("osau")?)?;
        OscillationRange::new(low, high).ok()
    }

    fn continuous_monitoring(&self) -> Option<bool> {
        parse_switch(self.get("rhtm")?)
    }

    fn sleep_timer(&self) -> Option<u16> {
        let raw = self.get("sltm")?;
        if raw == "OFF" {
            return None;
        }
        parse_number(raw).filter(|minutes| *minutes > 0)
    }

    fn fan_direction(&self) -> Option<FanDirection> {
        self.get("fdir")?.parse().ok()
    }

    fn hepa_filter_life(&self) -> Option<u8> {
        filter_life(self.get("hflr")?)
    }

    fn carbon_filter_life(&self) -> Option<u8> {
        filter_life(self.get("cflr")?)
    }

    fn filter_hours(&self) -> Option<u16> {
        parse_number(self.get("filf")?)
    }

    fn error_code(&self) -> Option<&str> {
        self.get("ercd")
    }

    fn warning_code(&self) -> Option<&str> {
        self.get("wacd")
    }

    fn firmware_auto_update(&self) -> Option<bool> {
        parse_switch(self.get("fdax")?)
    }
}
