// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener registration.
//!
//! Listeners are plain `Arc`-wrapped closures. Registration is idempotent:
//! adding the same `Arc` twice keeps one registration, and removing a listener
//! that is not registered is a no-op. Keep a clone of the `Arc` to remove it
//! later.
//!
//! Listeners run on the device's message task, one message at a time, after
//! the cached state has been updated.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use ventlink_lib::state::DeviceState;
//! use ventlink_lib::subscription::{ListenerSet, StateListener};
//!
//! let listeners: ListenerSet<_> = ListenerSet::new();
//! let listener: StateListener = Arc::new(|state: &DeviceState| println!("{} keys", state.len()));
//!
//! assert!(listeners.add(Arc::clone(&listener)));
//! assert!(!listeners.add(Arc::clone(&listener)));
//! assert!(listeners.remove(&listener));
//! assert!(listeners.is_empty());
//! ```

mod listeners;

pub use listeners::{
    ConnectionListener, EnvironmentalListener, FaultListener, FirmwareListener, ListenerRegistry,
    ListenerSet, StateListener,
};
