// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Humidifier accessors.

use super::{DeviceState, parse_number, parse_switch};
use crate::types::WaterHardness;

/// Typed read access to the humidifier fields of a [`DeviceState`].
pub trait HumidifierState {
    /// Humidification enabled (`hume` is `HUMD`).
    fn humidifier_enabled(&self) -> Option<bool>;

    /// Automatic humidity target (`haut`).
    fn humidifier_auto(&self) -> Option<bool>;

    /// Manual target humidity in percent (`humt`).
    fn target_humidity(&self) -> Option<u8>;

    /// Automatic target chosen by the device (`rect`).
    fn auto_target_humidity(&self) -> Option<u8>;

    /// Configured water hardness (`wath`).
    fn water_hardness(&self) -> Option<WaterHardness>;

    /// Minutes left in the running deep-clean cycle (`cdrr`).
    fn clean_time_remaining(&self) -> Option<u16>;

    /// Hours until the next deep clean is due (`cltr`).
    fn time_until_next_clean(&self) -> Option<u16>;
}

fn percent(raw: &str) -> Option<u8> {
    parse_number(raw).and_then(|value| u8::try_from(value).ok())
}

impl HumidifierState for DeviceState {
    fn humidifier_enabled(&self) -> Option<bool> {
        match self.get("hume")? {
            "HUMD" => Some(true),
            "OFF" => Some(false),
            _ => None,
        }
    }

    fn humidifier_auto(&self) -> Option<bool> {
        parse_switch(self.get("haut")?)
    }

    fn target_humidity(&self) -> Option<u8> {
        percent(self.get("humt")?)
    }

    fn auto_target_humidity(&self) -> Option<u8> {
        percent(self.get("rect")?)
    }

    fn water_hardness(&self) -> Option<WaterHardness> {
        self.get("wath")?.parse().ok()
    }

    fn clean_time_remaining(&self) -> Option<u16> {
        parse_number(self.get("cdrr")?)
    }

    fn time_until_next_clean(&self) -> Option<u16> {
        parse_number(self.get("cltr")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateMap;

    fn state(pairs: &[(&str, &str)]) -> DeviceState {
        DeviceState::from_map(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<StateMap>(),
        )
    }

    #[test]
    fn humidifier_fields() {
        let s = state(&[
            ("hume", "HUMD"),
            ("haut", "OFF"),
            ("humt", "0050"),
            ("wath", "1350"),
            ("cltr", "0720"),
        ]);

        assert_eq!(s.humidifier_enabled(), Some(true));
        assert_eq!(s.humidifier_auto(), Some(false));
        assert_eq!(s.target_humidity(), Some(50));
        assert_eq!(s.water_hardness(), Some(WaterHardness::Medium));
        assert_eq!(s.time_until_next_clean(), Some(720));
        assert_eq!(s.clean_time_remaining(), None);
    }

    #[test]
    fn unknown_tokens_are_none() {
        let s = state(&[("hume", "MAYBE"), ("wath", "9999"), ("humt", "OFF")]);
        assert_eq!(s.humidifier_enabled(), None);
        assert_eq!(s.water_hardness(), None);
        assert_eq!(s.target_humidity(), None);
    }
}
