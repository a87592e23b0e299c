// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic state refresh.
//!
//! Devices push `STATE-CHANGE` messages on their own, but go quiet when
//! nothing changes. The heartbeat asks for a fresh state and fresh sensor
//! readings whenever a whole interval passed without organic traffic, which
//! also keeps the session busy enough for the broker.
//!
//! The loop does not start before the host signals readiness through
//! [`HostReadiness`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{CommandDispatcher, Request};
use crate::protocol::Link;
use crate::state::StateStore;

/// Time between heartbeat ticks.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Readiness signal of the hosting application.
///
/// # Examples
///
/// ```
/// use ventlink_lib::heartbeat::HostReadiness;
///
/// let (readiness, signal) = HostReadiness::pending();
/// assert!(!readiness.is_ready());
/// signal.signal();
/// assert!(readiness.is_ready());
/// ```
#[derive(Debug, Clone)]
pub struct HostReadiness {
    rx: watch::Receiver<bool>,
}

/// Fires a [`HostReadiness`] once the host can process callbacks.
#[derive(Debug)]
pub struct ReadinessSignal {
    tx: watch::Sender<bool>,
}

impl HostReadiness {
    /// Returns a readiness that has already fired.
    #[must_use]
    pub fn ready() -> Self {
        let (_tx, rx) = watch::channel(true);
        Self { rx }
    }

    /// Returns a readiness that fires when the returned signal is used.
    #[must_use]
    pub fn pending() -> (Self, ReadinessSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { rx }, ReadinessSignal { tx })
    }

    /// Returns `true` once readiness was signalled.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until readiness is signalled.
    ///
    /// Returns `false` if the signal was dropped without firing.
    pub async fn wait_ready(&self) -> bool {
        let mut rx = self.rx.clone();
        rx.wait_for(|ready| *ready).await.is_ok()
    }
}

impl Default for HostReadiness {
    fn default() -> Self {
        Self::ready()
    }
}

impl ReadinessSignal {
    /// Marks the host as ready. Repeated calls have no further effect.
    pub fn signal(&self) {
        self.tx.send_replace(true);
    }
}

/// Owns the single heartbeat task of a device.
#[derive(Debug)]
pub struct HeartbeatScheduler {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatScheduler {
    /// Creates an idle scheduler ticking every [`HEARTBEAT_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(HEARTBEAT_INTERVAL)
    }

    /// Creates an idle scheduler with a custom tick interval.
    #[must_use]
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Returns the tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` while a heartbeat task exists.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts the heartbeat, replacing any running one.
    ///
    /// The previous task is cancelled and awaited first. The new loop waits
    /// for `readiness` before its first tick is scheduled.
    pub async fn start<L: Link>(
        &mut self,
        dispatcher: CommandDispatcher<L>,
        store: Arc<StateStore>,
        readiness: HostReadiness,
    ) {
        self.stop().await;
        let interval = self.interval;
        self.task = Some(tokio::spawn(run(dispatcher, store, readiness, interval)));
    }

    /// Cancels the heartbeat and waits for it to finish.
    ///
    /// Cancellation is expected and never reported.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();
        match task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => tracing::trace!("Heartbeat cancelled"),
            Err(e) => tracing::warn!(error = %e, "Heartbeat task ended abnormally"),
        }
    }
}

impl Default for HeartbeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<L: Link>(
    dispatcher: CommandDispatcher<L>,
    store: Arc<StateStore>,
    readiness: HostReadiness,
    interval: Duration,
) {
    if !readiness.is_ready() {
        tracing::debug!("Heartbeat waiting for host readiness");
    }
    if !readiness.wait_ready().await {
        tracing::debug!("Host readiness dropped, heartbeat not started");
        return;
    }

    let mut last_seen = store.generation();
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let current = store.generation();
        if current != last_seen {
            last_seen = current;
            tracing::trace!("State traffic since last tick, skipping refresh");
            continue;
        }

        tracing::debug!(topic = %dispatcher.topic(), "Heartbeat refresh");
        for request in [Request::CurrentState, Request::EnvironmentalData] {
            if let Err(e) = dispatcher.send(&request).await {
                tracing::warn!(request = request.as_str(), error = %e, "Heartbeat request failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::state::StateMap;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct RecordingLink {
        published: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingLink {
        fn messages(&self) -> Vec<String> {
            self.published
                .lock()
                .iter()
                .map(|payload| {
                    let value: serde_json::Value = serde_json::from_str(payload).unwrap();
                    value["msg"].as_str().unwrap().to_string()
                })
                .collect()
        }
    }

    impl Link for RecordingLink {
        async fn publish(&self, _topic: &str, payload: String) -> Result<(), ProtocolError> {
            self.published.lock().push(payload);
            if self.fail {
                return Err(ProtocolError::ConnectionFailed("offline".into()));
            }
            Ok(())
        }

        async fn subscribe(&self, _topic: &str) -> Result<(), ProtocolError> {
            Ok(())
        }

        async fn unsubscribe(&self, _topic: &str) -> Result<(), ProtocolError> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), ProtocolError> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn dispatcher(link: &Arc<RecordingLink>) -> CommandDispatcher<RecordingLink> {
        CommandDispatcher::new(Arc::clone(link), "438/SN1/command")
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_device_is_refreshed_every_interval() {
        let link = Arc::new(RecordingLink::default());
        let store = Arc::new(StateStore::new());
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat
            .start(dispatcher(&link), store, HostReadiness::ready())
            .await;

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(link.messages().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            link.messages(),
            vec![
                "REQUEST-CURRENT-STATE",
                "REQUEST-PRODUCT-ENVIRONMENT-CURRENT-SENSOR-DATA"
            ]
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(link.messages().len(), 4);
        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn organic_traffic_skips_one_tick() {
        let link = Arc::new(RecordingLink::default());
        let store = Arc::new(StateStore::new());
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat
            .start(dispatcher(&link), Arc::clone(&store), HostReadiness::ready())
            .await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        store.apply_delta(StateMap::from([("fnsp".to_string(), "0004".to_string())]));

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert!(link.messages().is_empty());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(link.messages().len(), 2);
        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_host_readiness() {
        let link = Arc::new(RecordingLink::default());
        let (readiness, signal) = HostReadiness::pending();
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat
            .start(dispatcher(&link), Arc::new(StateStore::new()), readiness)
            .await;

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert!(link.messages().is_empty());

        signal.signal();
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(link.messages().len(), 2);
        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn publish_errors_do_not_stop_the_loop() {
        let link = Arc::new(RecordingLink {
            fail: true,
            ..RecordingLink::default()
        });
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat
            .start(dispatcher(&link), Arc::new(StateStore::new()), HostReadiness::ready())
            .await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(link.messages().len(), 4);
        assert!(heartbeat.is_running());
        heartbeat.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restart_leaves_a_single_task() {
        let link = Arc::new(RecordingLink::default());
        let store = Arc::new(StateStore::new());
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat
            .start(dispatcher(&link), Arc::clone(&store), HostReadiness::ready())
            .await;
        heartbeat
            .start(dispatcher(&link), store, HostReadiness::ready())
            .await;

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(link.messages().len(), 2);

        heartbeat.stop().await;
        assert!(!heartbeat.is_running());
        heartbeat.stop().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(link.messages().len(), 2);
    }
}
