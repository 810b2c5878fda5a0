//! DispatchLoop - fires due items at the sink
//!
//! tick ごとに now を取り、due な item を store から抜いて 1 回だけ送る。
//!
//! # Delivery policy
//! At most one attempt per item. A failed or rejected send is logged and
//! the item is discarded: there is no retry and no dead-letter list. A retry
//! feature would need its own per-item attempt budget rather than putting
//! items back into the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::{DeliveryOutcome, ItemId, ItemState};
use crate::ports::{Clock, Sink};
use crate::store::PendingStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest accepted poll interval. `tokio::time::interval` panics on zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Counters for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The clock could not be read; nothing was drained.
    pub skipped: bool,
    pub drained: usize,
    pub delivered: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered { .. } => self.delivered += 1,
            DeliveryOutcome::Rejected { .. } => self.rejected += 1,
            DeliveryOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct DispatchLoop {
    store: Arc<PendingStore>,
    sink: Arc<dyn Sink>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl DispatchLoop {
    pub fn new(store: Arc<PendingStore>, sink: Arc<dyn Sink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            sink,
            clock,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Poll cadence. Bounds dispatch latency to roughly one interval past
    /// the scheduled time. Clamped to at least `MIN_POLL_INTERVAL`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            warn!(
                requested_ms = interval.as_millis() as u64,
                "poll interval too short, using the minimum"
            );
        }
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one scan: drain everything due and attempt each item once.
    ///
    /// Sends run concurrently on a `JoinSet`. A failing (or panicking) send
    /// only affects its own item.
    pub async fn tick(&self) -> TickReport {
        let now = match self.clock.now() {
            Ok(now) => now,
            Err(err) => {
                warn!(error = %err, "could not resolve current time, skipping tick");
                return TickReport::skipped();
            }
        };

        let due = self.store.drain_due(&now).await;
        let mut report = TickReport {
            drained: due.len(),
            ..TickReport::default()
        };
        if due.is_empty() {
            let next_due_at = self.store.next_due_at().await;
            debug!(now = %now, next_due_at = ?next_due_at, "tick: nothing due");
            return report;
        }

        let mut sends = JoinSet::new();
        for item in due {
            let sink = Arc::clone(&self.sink);
            let state = advance(item.id(), ItemState::Pending, ItemState::Due);
            advance(item.id(), state, ItemState::Dispatching);
            sends.spawn(async move {
                let outcome = sink.send(item.payload()).await;
                (item, outcome)
            });
        }

        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((item, outcome)) => {
                    advance(item.id(), ItemState::Dispatching, ItemState::Terminal);
                    report.record(&outcome);
                    let lateness_ms = (now - item.scheduled_at()).num_milliseconds();
                    if outcome.is_delivered() {
                        info!(item = %item.id(), %outcome, lateness_ms, "item sent");
                    } else {
                        warn!(item = %item.id(), %outcome, lateness_ms, "item send failed, discarding");
                    }
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(error = %err, "send task aborted, discarding item");
                }
            }
        }

        debug!(
            drained = report.drained,
            delivered = report.delivered,
            rejected = report.rejected,
            failed = report.failed,
            "tick complete"
        );
        report
    }

    /// Tick until shutdown is requested (or the sender is dropped).
    ///
    /// The first tick fires one interval after start. Missed ticks are
    /// delayed rather than burst.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() completes its first tick immediately
        ticker.tick().await;

        info!(interval_ms = self.interval.as_millis() as u64, "dispatch loop started");
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            self.tick().await;
        }
        info!("dispatch loop stopped");
    }

    /// Spawn `run` on the current runtime.
    pub fn spawn(self) -> DispatchHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        DispatchHandle { shutdown_tx, join }
    }
}

/// Handle to a spawned dispatch loop.
/// - `request_shutdown()` で現在の tick の後に止まる
/// - `shutdown_and_join()` は終了まで待つ
/// - handle を drop してもループは止まる
pub struct DispatchHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl DispatchHandle {
    pub fn request_shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(err) = self.join.await {
            warn!(error = %err, "dispatch loop ended abnormally");
        }
    }
}

/// Move an item one step along its lifecycle.
fn advance(id: ItemId, from: ItemState, to: ItemState) -> ItemState {
    debug_assert!(from.can_transition_to(to), "illegal transition {from:?} -> {to:?}");
    debug!(item = %id, ?from, ?to, "item state");
    to
}
