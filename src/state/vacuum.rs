// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Robot vacuum status mapping.
//!
//! The firmware is authoritative for state transitions. This module only maps
//! whatever it reports onto a small normalized activity set; it never rejects
//! an input.

use std::fmt;

use super::{DeviceState, parse_number};

/// Raw robot status as reported in `state` / `robotCurrentStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RobotStatus {
    /// Cleaning run in progress (including traversal and discovery phases).
    FullCleanRunning,
    /// Cleaning run paused.
    FullCleanPaused,
    /// Cleaning run docked to recharge before resuming.
    FullCleanCharging,
    /// Cleaning run heading back to the dock.
    FullCleanNeedsCharge,
    /// Cleaning run finished, aborted or abandoned.
    FullCleanFinished,
    /// On the dock, charging.
    InactiveCharging,
    /// On the dock, fully charged.
    InactiveCharged,
    /// Off the dock and idle.
    InactiveDischarging,
    /// Mapping run in progress.
    MappingRunning,
    /// Mapping run paused.
    MappingPaused,
    /// Mapping run docked to recharge.
    MappingCharging,
    /// Mapping run finished.
    MappingFinished,
    /// A fault state (`FAULT_*`), carrying the raw token.
    Fault(String),
    /// Machine switched off.
    MachineOff,
    /// Anything else, carrying the raw token.
    Unknown(String),
}

impl RobotStatus {
    /// Classifies a raw status token. Never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ventlink_lib::state::{RobotStatus, VacuumActivity};
    ///
    /// let status = RobotStatus::parse("FULL_CLEAN_PAUSED");
    /// assert_eq!(status, RobotStatus::FullCleanPaused);
    /// assert_eq!(status.activity(), VacuumActivity::Paused);
    ///
    /// assert_eq!(RobotStatus::parse("").activity(), VacuumActivity::Idle);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "FULL_CLEAN_RUNNING"
            | "FULL_CLEAN_INITIATED"
            | "FULL_CLEAN_TRAVERSING"
            | "FULL_CLEAN_DISCOVERING"
            | "FULL_CLEAN_MAPPING_RUNNING" => Self::FullCleanRunning,
            "FULL_CLEAN_PAUSED" | "FULL_CLEAN_MAPPING_PAUSED" => Self::FullCleanPaused,
            "FULL_CLEAN_CHARGING" => Self::FullCleanCharging,
            "FULL_CLEAN_NEEDS_CHARGE" => Self::FullCleanNeedsCharge,
            "FULL_CLEAN_FINISHED" | "FULL_CLEAN_ABORTED" | "FULL_CLEAN_ABANDONED" => {
                Self::FullCleanFinished
            }
            "INACTIVE_CHARGING" => Self::InactiveCharging,
            "INACTIVE_CHARGED" => Self::InactiveCharged,
            "INACTIVE_DISCHARGING" => Self::InactiveDischarging,
            "MAPPING_RUNNING" | "MAPPING_INITIATED" => Self::MappingRunning,
            "MAPPING_PAUSED" => Self::MappingPaused,
            "MAPPING_CHARGING" | "MAPPING_NEEDS_CHARGE" => Self::MappingCharging,
            "MAPPING_FINISHED" => Self::MappingFinished,
            "MACHINE_OFF" => Self::MachineOff,
            fault if fault.starts_with("FAULT_") => Self::Fault(fault.to_string()),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Collapses the raw status into the normalized activity.
    #[must_use]
    pub fn activity(&self) -> VacuumActivity {
        match self {
            Self::FullCleanRunning | Self::FullCleanNeedsCharge | Self::MappingRunning => {
                VacuumActivity::Cleaning
            }
            Self::FullCleanPaused | Self::MappingPaused => VacuumActivity::Paused,
            Self::FullCleanCharging
            | Self::InactiveCharging
            | Self::InactiveCharged
            | Self::MappingCharging => VacuumActivity::Docked,
            Self::Fault(_) => VacuumActivity::Error,
            Self::FullCleanFinished
            | Self::InactiveDischarging
            | Self::MappingFinished
            | Self::MachineOff
            | Self::Unknown(_) => VacuumActivity::Idle,
        }
    }
}

/// Normalized robot activity exposed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VacuumActivity {
    /// Cleaning or mapping.
    Cleaning,
    /// A run is paused.
    Paused,
    /// On the dock.
    Docked,
    /// Idle off the dock, or status unknown.
    Idle,
    /// Reporting a fault.
    Error,
}

impl VacuumActivity {
    /// Maps a raw status token straight to its activity.
    #[must_use]
    pub fn from_status(raw: &str) -> Self {
        RobotStatus::parse(raw).activity()
    }
}

impl fmt::Display for VacuumActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cleaning => "cleaning",
            Self::Paused => "paused",
            Self::Docked => "docked",
            Self::Idle => "idle",
            Self::Error => "error",
        })
    }
}

/// Typed read access to the robot vacuum fields of a [`DeviceState`].
pub trait RobotVacuumState {
    /// Raw status, from `state` or `robotCurrentStatus`.
    fn robot_status(&self) -> Option<RobotStatus>;

    /// Normalized activity; `Idle` when nothing was reported.
    fn activity(&self) -> VacuumActivity;

    /// Battery charge in percent (`batteryChargeLevel`).
    fn battery_level(&self) -> Option<u8>;

    /// Last known `(x, y)` position on the map (`globalPosition`).
    fn global_position(&self) -> Option<(i64, i64)>;

    /// Identifier of the active clean session (`cleanId`).
    fn clean_id(&self) -> Option<&str>;

    /// Type of the active clean (`fullCleanType`).
    fn clean_type(&self) -> Option<&str>;

    /// Current vacuum power mode (`currentVacuumPowerMode`).
    fn vacuum_power_mode(&self) -> Option<&str>;
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl RobotVacuumState for DeviceState {
    fn robot_status(&self) -> Option<RobotStatus> {
        self.get("state")
            .or_else(|| self.get("robotCurrentStatus"))
            .map(RobotStatus::parse)
    }

    fn activity(&self) -> VacuumActivity {
        self.robot_status()
            .as_ref()
            .map_or(VacuumActivity::Idle, RobotStatus::activity)
    }

    fn battery_level(&self) -> Option<u8> {
        let level = parse_number(self.get("batteryChargeLevel")?)?;
        // Clamped to [0, 100].
        #[allow(clippy::cast_possible_truncation)]
        Some(level.min(100) as u8)
    }

    fn global_position(&self) -> Option<(i64, i64)> {
        let coords: Vec<i64> = serde_json::from_str(self.get("globalPosition")?).ok()?;
        match coords.as_slice() {
            [x, y] => Some((*x, *y)),
            _ => None,
        }
    }

    fn clean_id(&self) -> Option<&str> {
        non_empty(self.get("cleanId"))
    }

    fn clean_type(&self) -> Option<&str> {
        non_empty(self.get("fullCleanType"))
    }

    fn vacuum_power_mode(&self) -> Option<&str> {
        non_empty(self.get("currentVacuumPowerMode"))
    }
}
