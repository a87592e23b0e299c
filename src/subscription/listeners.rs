// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener sets and the per-device registry.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::connection::ConnectionStatus;
use crate::fault::FaultEntry;
use crate::firmware::FirmwareStatus;
use crate::state::{DeviceState, EnvironmentalData};

/// Receives a snapshot after every product-state update.
pub type StateListener = Arc<dyn Fn(&DeviceState) + Send + Sync>;

/// Receives the readings after every environmental update.
pub type EnvironmentalListener = Arc<dyn Fn(&EnvironmentalData) + Send + Sync>;

/// Receives the active faults after every fault report.
pub type FaultListener = Arc<dyn Fn(&[FaultEntry]) + Send + Sync>;

/// Receives firmware progress reports.
pub type FirmwareListener = Arc<dyn Fn(&FirmwareStatus) + Send + Sync>;

/// Receives connection status changes.
pub type ConnectionListener = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// An idempotent set of listeners, compared by `Arc` identity.
pub struct ListenerSet<T: ?Sized> {
    listeners: RwLock<Vec<Arc<T>>>,
}

impl<T: ?Sized> ListenerSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Registers `listener`.
    ///
    /// Returns `false` if it was already registered.
    pub fn add(&self, listener: Arc<T>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregisters `listener`.
    ///
    /// Returns `false` if it was not registered.
    pub fn remove(&self, listener: &Arc<T>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// Clones the current registrations.
    ///
    /// Dispatch iterates over this copy so a listener may add or remove
    /// listeners without deadlocking.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.listeners.read().clone()
    }
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for ListenerSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}

/// All listener sets of one device.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    /// Product-state listeners.
    pub state: ListenerSet<dyn Fn(&DeviceState) + Send + Sync>,
    /// Environmental listeners.
    pub environmental: ListenerSet<dyn Fn(&EnvironmentalData) + Send + Sync>,
    /// Fault listeners.
    pub faults: ListenerSet<dyn Fn(&[FaultEntry]) + Send + Sync>,
    /// Firmware progress listeners.
    pub firmware: ListenerSet<dyn Fn(&FirmwareStatus) + Send + Sync>,
    /// Connection status listeners.
    pub connection: ListenerSet<dyn Fn(ConnectionStatus) + Send + Sync>,
}

impl ListenerRegistry {
    /// Creates a registry with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifies state listeners.
    pub fn dispatch_state(&self, state: &DeviceState) {
        for listener in self.state.snapshot() {
            listener(state);
        }
    }

    /// Notifies environmental listeners.
    pub fn dispatch_environmental(&self, data: &EnvironmentalData) {
        for listener in self.environmental.snapshot() {
            listener(data);
        }
    }

    /// Notifies fault listeners.
    pub fn dispatch_faults(&self, faults: &[FaultEntry]) {
        for listener in self.faults.snapshot() {
            listener(faults);
        }
    }

    /// Notifies firmware listeners.
    pub fn dispatch_firmware(&self, status: &FirmwareStatus) {
        for listener in self.firmware.snapshot() {
            listener(status);
        }
    }

    /// Notifies connection listeners.
    pub fn dispatch_connection(&self, status: ConnectionStatus) {
        for listener in self.connection.snapshot() {
            listener(status);
        }
    }

    /// Returns the total number of registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.len()
            + self.environmental.len()
            + self.faults.len()
            + self.firmware.len()
            + self.connection.len()
    }
}
