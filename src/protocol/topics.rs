// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device topic layout.
//!
//! ```text
//! <prefix>/<serial>/command          outbound commands
//! <prefix>/<serial>/status/current   state and environmental pushes
//! <prefix>/<serial>/status/fault     fault reports
//! <prefix>/<serial>/status/software  firmware upgrade progress
//! ```

/// Which inbound topic a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    /// `status/current`
    Current,
    /// `status/fault`
    Fault,
    /// `status/software`
    Software,
}

/// The topics of one device.
///
/// # Examples
///
/// ```
/// use ventlink_lib::protocol::{DeviceTopics, TopicKind};
///
/// let topics = DeviceTopics::new("438", "NK6-EU-MHA0000A");
/// assert_eq!(topics.command(), "438/NK6-EU-MHA0000A/command");
/// assert_eq!(
///     topics.classify("438/NK6-EU-MHA0000A/status/fault"),
///     Some(TopicKind::Fault)
/// );
/// assert_eq!(topics.classify("438/OTHER/status/fault"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    command: String,
    current: String,
    fault: String,
    software: String,
}

impl DeviceTopics {
    /// Builds the topic set for `serial` under `prefix`.
    #[must_use]
    pub fn new(prefix: &str, serial: &str) -> Self {
        let base = format!("{prefix}/{serial}");
        Self {
            command: format!("{base}/command"),
            current: format!("{base}/status/current"),
            fault: format!("{base}/status/fault"),
            software: format!("{base}/status/software"),
        }
    }

    /// The command topic.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The state topic.
    #[must_use]
    pub fn status_current(&self) -> &str {
        &self.current
    }

    /// The fault topic.
    #[must_use]
    pub fn status_fault(&self) -> &str {
        &self.fault
    }

    /// The firmware progress topic.
    #[must_use]
    pub fn status_software(&self) -> &str {
        &self.software
    }

    /// The topics subscribed to on connect.
    #[must_use]
    pub fn subscriptions(&self) -> [&str; 3] {
        [&self.current, &self.fault, &self.software]
    }

    /// Classifies an inbound topic; `None` for topics of other devices.
    #[must_use]
    pub fn classify(&self, topic: &str) -> Option<TopicKind> {
        if topic == self.current {
            Some(TopicKind::Current)
        } else if topic == self.fault {
            Some(TopicKind::Fault)
        } else if topic == self.software {
            Some(TopicKind::Software)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_layout() {
        let topics = DeviceTopics::new("527", "ABC");
        assert_eq!(topics.status_current(), "527/ABC/status/current");
        assert_eq!(topics.status_fault(), "527/ABC/status/fault");
        assert_eq!(topics.status_software(), "527/ABC/status/software");
        assert_eq!(
            topics.subscriptions(),
            [
                "527/ABC/status/current",
                "527/ABC/status/fault",
                "527/ABC/status/software"
            ]
        );
    }

    #[test]
    fn classify_rejects_command_topic() {
        let topics = DeviceTopics::new("527", "ABC");
        assert_eq!(topics.classify("527/ABC/command"), None);
        assert_eq!(
            topics.classify("527/ABC/status/current"),
            Some(TopicKind::Current)
        );
    }
}
