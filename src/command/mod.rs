// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound command definitions.
//!
//! The protocol has no acknowledgement: a command is correct only if it is
//! encoded exactly the way the firmware expects. Every type here checks its
//! values before a payload is produced.
//!
//! # Available Commands
//!
//! | Command Type | `msg` | Purpose |
//! |-------------|-------|---------|
//! | [`StateSet`] | `STATE-SET` | Change settings (`data` object) |
//! | [`Request`] | `REQUEST-*` | Ask for state, faults or sensor data |
//! | [`SoftwareUpgrade`] | `SOFTWARE-UPGRADE` | Trigger a firmware upgrade |
//! | [`RobotCommand`] | `STATE-SET` / `REQUEST-CURRENT-STATE` | Robot vacuum actions |
//! | [`RawCommand`] | any | Arbitrary discriminator and data |
//!
//! # Examples
//!
//! ```
//! use ventlink_lib::command::{Command, StateSet};
//! use ventlink_lib::types::FanSpeed;
//! use ventlink_lib::PowerControl;
//!
//! let cmd = StateSet::fan_speed(FanSpeed::new(6).unwrap(), PowerControl::Fpwr);
//! assert_eq!(cmd.msg(), "STATE-SET");
//!
//! let data = cmd.data().unwrap();
//! assert_eq!(data["fnsp"], "0006");
//! assert_eq!(data["fpwr"], "ON");
//! ```

mod dispatcher;
mod request;
mod robot;
mod state_set;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use dispatcher::CommandDispatcher;
pub use request::{RawCommand, Request, SoftwareUpgrade};
pub use robot::{RobotCommand, VacuumPowerMode};
pub use state_set::{FilterKind, StateSet};

use crate::protocol::Envelope;

/// A message that can be published on the command topic.
pub trait Command {
    /// Returns the `msg` discriminator.
    fn msg(&self) -> &str;

    /// Returns the `data` object, if the command carries one.
    fn data(&self) -> Option<Map<String, Value>> {
        None
    }

    /// Returns extra top-level fields.
    fn extra(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Wraps the command in an envelope stamped with `at`.
    fn envelope(&self, at: DateTime<Utc>) -> Envelope {
        let mut envelope = Envelope::new(self.msg(), at);
        if let Some(data) = self.data() {
            envelope = envelope.with_data(data);
        }
        for (key, value) in self.extra() {
            envelope = envelope.with_field(key, value);
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn envelope_includes_data_and_extra() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = RobotCommand::Pause.envelope(at).encode().unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["msg"], "STATE-SET");
        assert_eq!(parsed["robotAction"], "PAUSE");
        assert_eq!(parsed["time"], "2024-03-01T12:00:00.000Z");
        assert!(parsed.get("data").is_none());
    }

    #[test]
    fn request_has_no_data() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let envelope = Request::CurrentState.envelope(at);
        assert_eq!(envelope.msg(), "REQUEST-CURRENT-STATE");
        assert!(envelope.data().is_none());
    }
}
