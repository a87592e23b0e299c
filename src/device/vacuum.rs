// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Robot vacuum sub-API.

use super::Device;
use crate::command::{RobotCommand, VacuumPowerMode};
use crate::config::DeviceCategory;
use crate::error::Error;
use crate::protocol::Connector;
use crate::state::{RobotVacuumState, VacuumActivity};

/// Robot vacuum controls of a [`Device`].
///
/// Obtained through [`Device::vacuum`], which returns `None` for any other
/// category.
///
/// ```no_run
/// # async fn example(device: &ventlink_lib::Device) -> ventlink_lib::Result<()> {
/// if let Some(robot) = device.vacuum() {
///     robot.pause().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RobotVacuum<'a, C: Connector> {
    device: &'a Device<C>,
}

impl<C: Connector> Device<C> {
    /// Returns the robot vacuum controls, for robot vacuums only.
    #[must_use]
    pub fn vacuum(&self) -> Option<RobotVacuum<'_, C>> {
        (self.category() == DeviceCategory::RobotVacuum).then_some(RobotVacuum { device: self })
    }
}

impl<C: Connector> RobotVacuum<'_, C> {
    /// Pauses the running clean.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn pause(&self) -> Result<(), Error> {
        self.device.send(&RobotCommand::Pause).await
    }

    /// Resumes a paused clean.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn resume(&self) -> Result<(), Error> {
        self.device.send(&RobotCommand::Resume).await
    }

    /// Aborts the clean; the robot returns to its dock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn abort(&self) -> Result<(), Error> {
        self.device.send(&RobotCommand::Abort).await
    }

    /// Asks the robot for its current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn request_state(&self) -> Result<(), Error> {
        self.device.send(&RobotCommand::RequestState).await
    }

    /// Changes the default suction power.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no session is active.
    pub async fn set_power_mode(&self, mode: VacuumPowerMode) -> Result<(), Error> {
        self.device.send(&RobotCommand::SetPowerMode(mode)).await
    }

    /// Returns the normalized activity from the cached state.
    #[must_use]
    pub fn activity(&self) -> VacuumActivity {
        self.device.snapshot().activity()
    }

    /// Returns the battery level from the cached state.
    #[must_use]
    pub fn battery_level(&self) -> Option<u8> {
        self.device.snapshot().battery_level()
    }
}
