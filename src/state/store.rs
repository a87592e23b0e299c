// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single source of truth for cached device data.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;

use super::device_state::derive_faults;
use super::{DeviceState, EnvironmentalData, StateMap};
use crate::fault::FaultEntry;

#[derive(Debug, Default)]
struct Inner {
    product_state: StateMap,
    environmental: StateMap,
    faults: Vec<FaultEntry>,
    state_faults: Vec<FaultEntry>,
}

impl Inner {
    /// Re-derives the `ercd`/`wacd` faults after a product-state write.
    ///
    /// A code whose value did not change keeps its first observation time.
    fn refresh_state_faults(&mut self) {
        let fresh = derive_faults(&self.product_state, Utc::now());
        self.state_faults = fresh
            .into_iter()
            .map(|entry| {
                self.state_faults
                    .iter()
                    .find(|known| known.code == entry.code && known.value == entry.value)
                    .cloned()
                    .unwrap_or(entry)
            })
            .collect();
    }
}

/// Holds the product-state map, environmental readings and active faults.
///
/// Writes come only from the message router task. Reads return copies taken
/// under the lock, so a reader never observes a half-applied update.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<Inner>,
    generation: AtomicU64,
}

impl StateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole product-state map (`CURRENT-STATE`).
    pub fn apply_full_state(&self, state: StateMap) {
        let mut inner = self.inner.write();
        inner.product_state = state;
        inner.refresh_state_faults();
    }

    /// Overlays `delta` on the product-state map (`STATE-CHANGE`).
    ///
    /// Keys absent from `delta` keep their previous value.
    pub fn apply_delta(&self, delta: StateMap) {
        {
            let mut inner = self.inner.write();
            inner.product_state.extend(delta);
            inner.refresh_state_faults();
        }
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Replaces the environmental readings wholesale.
    pub fn apply_environmental(&self, data: StateMap) {
        self.inner.write().environmental = data;
    }

    /// Replaces the list of active faults.
    pub fn apply_faults(&self, faults: Vec<FaultEntry>) {
        self.inner.write().faults = faults;
    }

    /// Returns a copy of the product state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        DeviceState::from_map(self.inner.read().product_state.clone())
    }

    /// Returns a copy of the environmental readings.
    #[must_use]
    pub fn environmental(&self) -> EnvironmentalData {
        EnvironmentalData::from_map(self.inner.read().environmental.clone())
    }

    /// Returns a copy of the active faults from the fault topic.
    #[must_use]
    pub fn faults(&self) -> Vec<FaultEntry> {
        self.inner.read().faults.clone()
    }

    /// Returns every active fault.
    ///
    /// Fault-topic entries come first, followed by the faults derived from
    /// the `ercd`/`wacd` state codes that the fault topic did not report.
    /// Derived entries carry the time the state message introducing them was
    /// applied.
    #[must_use]
    pub fn active_faults(&self) -> Vec<FaultEntry> {
        let inner = self.inner.read();
        let mut faults = inner.faults.clone();
        for derived in &inner.state_faults {
            if !faults.iter().any(|f| f.code == derived.code) {
                faults.push(derived.clone());
            }
        }
        faults
    }

    /// Counter bumped on every `STATE-CHANGE` merge.
    ///
    /// The heartbeat compares it between ticks to tell whether organic state
    /// traffic arrived. Full states are answers to requests and do not count.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> StateMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn full_state_then_delta_merges() {
        let store = StateStore::new();
        store.apply_full_state(map(&[("fpwr", "ON"), ("fnsp", "0006")]));
        store.apply_delta(map(&[("nmod", "ON")]));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("fpwr"), Some("ON"));
        assert_eq!(snapshot.get("fnsp"), Some("0006"));
        assert_eq!(snapshot.get("nmod"), Some("ON"));
    }

    #[test]
    fn deltas_overlay_in_order() {
        let store = StateStore::new();
        let full = map(&[("fpwr", "ON"), ("fnsp", "0006"), ("oson", "OFF")]);
        let deltas = [
            map(&[("fnsp", "0002")]),
            map(&[("oson", "ON"), ("fnsp", "0009")]),
            map(&[("sltm", "0060")]),
        ];

        store.apply_full_state(full.clone());
        let mut expected = full;
        for delta in deltas {
            expected.extend(delta.clone());
            store.apply_delta(delta);
        }

        assert_eq!(store.snapshot().into_map(), expected);
    }

    #[test]
    fn full_state_replaces_previous_keys() {
        let store = StateStore::new();
        store.apply_full_state(map(&[("fpwr", "ON"), ("nmod", "ON")]));
        store.apply_full_state(map(&[("fpwr", "OFF")]));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("nmod"), None);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let store = StateStore::new();
        store.apply_full_state(map(&[("fpwr", "ON")]));
        let before = store.snapshot();
        store.apply_delta(map(&[("fpwr", "OFF")]));

        assert_eq!(before.get("fpwr"), Some("ON"));
        assert_eq!(store.snapshot().get("fpwr"), Some("OFF"));
    }

    #[test]
    fn environmental_is_replaced_wholesale() {
        let store = StateStore::new();
        store.apply_environmental(map(&[("pm25", "0010"), ("pm10", "0012")]));
        store.apply_environmental(map(&[("pm25", "0003")]));

        let env = store.environmental();
        assert_eq!(env.get("pm25"), Some("0003"));
        assert_eq!(env.get("pm10"), None);
    }

    #[test]
    fn state_faults_keep_their_first_observation_time() {
        let store = StateStore::new();
        store.apply_full_state(map(&[("ercd", "02C0"), ("fpwr", "ON")]));
        let first = store.active_faults();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].code, "ercd");

        std::thread::sleep(std::time::Duration::from_millis(5));
        store.apply_delta(map(&[("fnsp", "0004")]));
        store.apply_full_state(map(&[("ercd", "02C0"), ("fpwr", "OFF")]));
        assert_eq!(store.active_faults(), first);
        assert_eq!(store.active_faults(), first);

        store.apply_delta(map(&[("ercd", "03A1")]));
        let changed = store.active_faults();
        assert_eq!(changed[0].value, "03A1");
        assert!(changed[0].observed_at > first[0].observed_at);

        store.apply_delta(map(&[("ercd", "NONE")]));
        assert!(store.active_faults().is_empty());
    }

    #[test]
    fn topic_faults_take_precedence_over_state_codes() {
        let store = StateStore::new();
        let at = Utc::now();
        store.apply_faults(vec![FaultEntry::new("ercd", "02C0", at)]);
        store.apply_full_state(map(&[("ercd", "02C0"), ("wacd", "0B10")]));

        let faults = store.active_faults();
        let codes: Vec<&str> = faults.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["ercd", "wacd"]);
        assert_eq!(faults[0].observed_at, at);
    }

    #[test]
    fn generation_tracks_state_changes_only() {
        let store = StateStore::new();
        assert_eq!(store.generation(), 0);
        store.apply_full_state(StateMap::new());
        store.apply_delta(StateMap::new());
        store.apply_environmental(StateMap::new());
        store.apply_delta(StateMap::new());
        assert_eq!(store.generation(), 2);
    }
}
