// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command publishing over an open session.

use std::sync::Arc;

use chrono::Utc;

use super::Command;
use crate::error::Error;
use crate::protocol::Link;

/// Encodes commands and publishes them on a device's command topic.
#[derive(Debug)]
pub struct CommandDispatcher<L> {
    link: Arc<L>,
    topic: String,
}

impl<L> Clone for CommandDispatcher<L> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
            topic: self.topic.clone(),
        }
    }
}

impl<L: Link> CommandDispatcher<L> {
    /// Creates a dispatcher publishing on `topic` through `link`.
    #[must_use]
    pub fn new(link: Arc<L>, topic: impl Into<String>) -> Self {
        Self {
            link,
            topic: topic.into(),
        }
    }

    /// Returns the command topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns `true` while the underlying session reports connectivity.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Publishes `command`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be encoded or the publish
    /// fails.
    pub async fn send<C: Command + ?Sized>(&self, command: &C) -> Result<(), Error> {
        let payload = command.envelope(Utc::now()).encode()?;
        tracing::debug!(topic = %self.topic, payload = %payload, "Publishing command");
        self.link.publish(&self.topic, payload).await?;
        Ok(())
    }
}
