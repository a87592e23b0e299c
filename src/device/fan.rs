// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan, purifier, heater and humidifier controls.
//!
//! Every operation returns [`Error::NotConnected`] without publishing when no
//! session is active.

use super::Device;
use crate::capabilities::Capability;
use crate::command::{FilterKind, SoftwareUpgrade, StateSet};
use crate::error::Error;
use crate::protocol::Connector;
use crate::types::{
    FanDirection, FanSpeed, OscillationRange, PowerState, SleepTimer, TargetHumidity,
    TargetTemperature, WaterHardness,
};

impl<C: Connector> Device<C> {
    // ========== Power & Speed ==========

    /// Switches the fan on or off.
    ///
    /// The field used follows the inferred power-control scheme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active, or a protocol
    /// error if the publish fails.
    pub async fn set_power(&self, state: PowerState) -> Result<(), Error> {
        self.send(&StateSet::power(state, self.power_control())).await
    }

    /// Switches the fan on.
    ///
    /// # Errors
    ///
    /// See [`Device::set_power`].
    pub async fn power_on(&self) -> Result<(), Error> {
        self.set_power(PowerState::On).await
    }

    /// Switches the fan off.
    ///
    /// # Errors
    ///
    /// See [`Device::set_power`].
    pub async fn power_off(&self) -> Result<(), Error> {
        self.set_power(PowerState::Off).await
    }

    /// Sets the fan speed. `FanSpeed::Auto` enables automatic mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_fan_speed(&self, speed: FanSpeed) -> Result<(), Error> {
        self.send(&StateSet::fan_speed(speed, self.power_control()))
            .await
    }

    /// Sets the fan speed from a raw level, rejecting values outside 1..=10.
    ///
    /// # Errors
    ///
    /// Returns a value error for an out-of-range level.
    pub async fn set_fan_speed_level(&self, level: i64) -> Result<(), Error> {
        let speed = FanSpeed::from_level(level)?;
        self.set_fan_speed(speed).await
    }

    /// Enables or disables automatic mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_auto_mode(&self, enabled: bool) -> Result<(), Error> {
        self.send(&StateSet::auto_mode(enabled, self.power_control()))
            .await
    }

    /// Enables or disables night mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_night_mode(&self, enabled: bool) -> Result<(), Error> {
        self.send(&StateSet::night_mode(enabled)).await
    }

    /// Enables or disables monitoring while the fan is off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_continuous_monitoring(&self, enabled: bool) -> Result<(), Error> {
        self.send(&StateSet::continuous_monitoring(enabled)).await
    }

    /// Sets the airflow direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_fan_direction(&self, direction: FanDirection) -> Result<(), Error> {
        self.send(&StateSet::fan_direction(direction)).await
    }

    // ========== Oscillation ==========

    /// Enables or disables oscillation, optionally with an explicit sweep.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_oscillation(
        &self,
        enabled: bool,
        range: Option<OscillationRange>,
    ) -> Result<(), Error> {
        let day1 = self.capabilities().uses_day1_oscillation();
        self.send(&StateSet::oscillation(enabled, range, day1)).await
    }

    /// Sets the oscillation sweep and enables oscillation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_oscillation_range(&self, range: OscillationRange) -> Result<(), Error> {
        let day1 = self.capabilities().uses_day1_oscillation();
        self.send(&StateSet::oscillation_range(range, day1)).await
    }

    // ========== Sleep Timer ==========

    /// Sets the sleep timer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_sleep_timer(&self, timer: SleepTimer) -> Result<(), Error> {
        self.send(&StateSet::sleep_timer(Some(timer))).await
    }

    /// Clears the sleep timer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn clear_sleep_timer(&self) -> Result<(), Error> {
        self.send(&StateSet::sleep_timer(None)).await
    }

    // ========== Heating ==========

    /// Enables or disables heating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] without `Heating`.
    pub async fn set_heat_mode(&self, enabled: bool) -> Result<(), Error> {
        self.require(&Capability::Heating, self.capabilities().supports_heating())?;
        self.send(&StateSet::heat_mode(enabled)).await
    }

    /// Sets the heating target and enables heating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] without `Heating`.
    pub async fn set_target_temperature(&self, target: TargetTemperature) -> Result<(), Error> {
        self.require(&Capability::Heating, self.capabilities().supports_heating())?;
        self.send(&StateSet::target_temperature(target)).await
    }

    // ========== Humidifier ==========

    /// Enables or disables humidification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] without `Humidifier`.
    pub async fn set_humidifier(&self, enabled: bool) -> Result<(), Error> {
        self.require_humidifier()?;
        self.send(&StateSet::humidifier(enabled)).await
    }

    /// Enables or disables the automatic humidity target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] without `Humidifier`.
    pub async fn set_humidifier_auto(&self, enabled: bool) -> Result<(), Error> {
        self.require_humidifier()?;
        self.send(&StateSet::humidifier_auto(enabled)).await
    }

    /// Sets a manual humidity target in percent.
    ///
    /// Values are snapped to 10-point steps and clamped to 30..=70.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] without `Humidifier`.
    pub async fn set_target_humidity(&self, percent: u16) -> Result<(), Error> {
        self.require_humidifier()?;
        self.send(&StateSet::target_humidity(TargetHumidity::new(percent)))
            .await
    }

    /// Sets the water hardness used for scale control.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] without `Humidifier`.
    pub async fn set_water_hardness(&self, hardness: WaterHardness) -> Result<(), Error> {
        self.require_humidifier()?;
        self.send(&StateSet::water_hardness(hardness)).await
    }

    // ========== Maintenance ==========

    /// Marks a filter as replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn reset_filter(&self, filter: FilterKind) -> Result<(), Error> {
        self.send(&StateSet::reset_filter(filter)).await
    }

    /// Enables or disables automatic firmware updates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_firmware_auto_update(&self, enabled: bool) -> Result<(), Error> {
        self.send(&StateSet::firmware_auto_update(enabled)).await
    }

    /// Tells the device to install firmware `version`.
    ///
    /// # Errors
    ///
    /// Returns a value error for a blank version, or [`Error::NotConnected`].
    pub async fn upgrade_firmware(&self, version: &str) -> Result<(), Error> {
        let command = SoftwareUpgrade::new(self.config().product_type(), version)?;
        tracing::info!(
            serial = %self.serial(),
            version = %command.version(),
            "Requesting firmware upgrade"
        );
        self.send(&command).await
    }

    fn require(&self, capability: &Capability, supported: bool) -> Result<(), Error> {
        self.check_capability(capability.as_str(), supported)
    }

    fn require_humidifier(&self) -> Result<(), Error> {
        self.require(
            &Capability::Humidifier,
            self.capabilities().supports_humidifier(),
        )
    }
}
