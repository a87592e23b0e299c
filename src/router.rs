// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound message routing.
//!
//! ```text
//! 438/<serial>/status/current  {"msg":"STATE-CHANGE", ...}
//!                     ↓
//!            MessageRouter::route()
//!                     ↓
//!   PowerControlDetector::observe()  +  StateStore::apply_delta()
//!                     ↓
//!        ListenerRegistry::dispatch_state(snapshot)
//! ```
//!
//! Malformed payloads and unknown discriminators are counted and dropped; they
//! never interrupt processing of later messages.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::capabilities::PowerControlDetector;
use crate::fault::normalize_faults;
use crate::firmware::FirmwareStatus;
use crate::protocol::{DeviceTopics, InboundMessage, TopicKind};
use crate::state::StateStore;
use crate::subscription::ListenerRegistry;

/// Router counters, copied out by [`MessageRouter::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Messages applied to the store or forwarded to listeners.
    pub handled: u64,
    /// Messages with a discriminator this engine does not handle.
    pub unknown_discriminators: u64,
    /// Payloads that could not be decoded.
    pub malformed_payloads: u64,
    /// Messages on topics that do not belong to this device.
    pub foreign_topics: u64,
}

#[derive(Debug, Default)]
struct Counters {
    handled: AtomicU64,
    unknown: AtomicU64,
    malformed: AtomicU64,
    foreign: AtomicU64,
}

/// Decodes inbound payloads, updates the store and notifies listeners.
#[derive(Debug)]
pub struct MessageRouter {
    topics: DeviceTopics,
    store: Arc<StateStore>,
    listeners: Arc<ListenerRegistry>,
    detector: Arc<PowerControlDetector>,
    counters: Counters,
}

impl MessageRouter {
    /// Creates a router for the device owning `topics`.
    #[must_use]
    pub fn new(
        topics: DeviceTopics,
        store: Arc<StateStore>,
        listeners: Arc<ListenerRegistry>,
        detector: Arc<PowerControlDetector>,
    ) -> Self {
        Self {
            topics,
            store,
            listeners,
            detector,
            counters: Counters::default(),
        }
    }

    /// Handles one inbound message.
    pub fn route(&self, topic: &str, payload: &str) {
        match self.topics.classify(topic) {
            Some(TopicKind::Current) => self.route_current(payload),
            Some(TopicKind::Fault) => self.route_faults(payload),
            Some(TopicKind::Software) => self.route_firmware(payload),
            None => {
                self.counters.foreign.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(topic = %topic, "Ignoring message for another topic");
            }
        }
    }

    /// Returns a copy of the counters.
    #[must_use]
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            handled: self.counters.handled.load(Ordering::Relaxed),
            unknown_discriminators: self.counters.unknown.load(Ordering::Relaxed),
            malformed_payloads: self.counters.malformed.load(Ordering::Relaxed),
            foreign_topics: self.counters.foreign.load(Ordering::Relaxed),
        }
    }

    fn route_current(&self, payload: &str) {
        let message = match InboundMessage::decode(payload) {
            Ok(message) => message,
            Err(e) => {
                self.malformed(&e);
                return;
            }
        };

        match message {
            InboundMessage::CurrentState(state) => {
                self.detector.observe(&state);
                self.store.apply_full_state(state);
                self.handled();
                self.listeners.dispatch_state(&self.store.snapshot());
            }
            InboundMessage::StateChange(delta) => {
                self.detector.observe(&delta);
                self.store.apply_delta(delta);
                self.handled();
                self.listeners.dispatch_state(&self.store.snapshot());
            }
            InboundMessage::Environmental(data) => {
                self.store.apply_environmental(data);
                self.handled();
                self.listeners
                    .dispatch_environmental(&self.store.environmental());
            }
            InboundMessage::Faults(raw) => self.apply_faults(&raw),
            InboundMessage::Unknown(msg) => {
                self.counters.unknown.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(msg = %msg, "Dropping message with unknown discriminator");
            }
        }
    }

    fn route_faults(&self, payload: &str) {
        match serde_json::from_str::<Value>(payload) {
            Ok(raw) => self.apply_faults(&raw),
            Err(e) => self.malformed(&e),
        }
    }

    fn apply_faults(&self, raw: &Value) {
        let faults = normalize_faults(raw);
        if !faults.is_empty() {
            tracing::info!(count = faults.len(), "Device reported faults");
        }
        self.store.apply_faults(faults.clone());
        self.handled();
        self.listeners.dispatch_faults(&faults);
    }

    fn route_firmware(&self, payload: &str) {
        match FirmwareStatus::decode(payload) {
            Ok(status) => {
                tracing::debug!(
                    msg = %status.msg,
                    progress = ?status.progress,
                    "Firmware status received"
                );
                self.handled();
                self.listeners.dispatch_firmware(&status);
            }
            Err(e) => self.malformed(&e),
        }
    }

    fn handled(&self) {
        self.counters.handled.fetch_add(1, Ordering::Relaxed);
    }

    fn malformed(&self, error: &dyn std::fmt::Display) {
        self.counters.malformed.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(error = %error, "Dropping malformed payload");
    }
}
