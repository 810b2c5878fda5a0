//! In-memory pending store.
//!
//! プロセス内のみ。再起動で全部消える（永続化しない）。

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use chrono::DateTime;
use chrono_tz::Tz;
use tokio::sync::Mutex;

use crate::domain::ScheduledItem;

/// Heap entry.
///
/// Ordering is reversed so `BinaryHeap` acts as a min-heap: earliest
/// `scheduled_at` first, ties broken by enqueue sequence.
#[derive(Debug)]
struct PendingEntry {
    seq: u64,
    item: ScheduledItem,
}

impl PendingEntry {
    fn key(&self) -> (DateTime<Tz>, u64) {
        (self.item.scheduled_at(), self.seq)
    }
}

impl PartialEq for PendingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PendingEntry {}

impl PartialOrd for PendingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

#[derive(Debug, Default)]
struct PendingState {
    heap: BinaryHeap<PendingEntry>,

    /// Next enqueue sequence number. Preserves insertion order for ties and
    /// for `snapshot`.
    next_seq: u64,
}

/// Items waiting for their scheduled time.
///
/// Design:
/// - One lock guards the whole collection; every read and every
///   read-modify-write happens under it.
/// - The lock is never held across a send. `drain_due` hands due items back
///   to the caller, who dispatches them outside the lock.
/// - Shared explicitly (`Arc<PendingStore>`) between the intake and the
///   dispatch loop.
#[derive(Debug, Default)]
pub struct PendingStore {
    state: Mutex<PendingState>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Any `scheduled_at` is accepted; past times are due on
    /// the next scan.
    pub async fn enqueue(&self, item: ScheduledItem) {
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(PendingEntry { seq, item });
    }

    /// Remove and return every item with `scheduled_at <= now`.
    ///
    /// The partition happens under a single lock acquisition: the store
    /// keeps exactly the not-due items afterwards. Returned items are in
    /// scheduled order, ties in enqueue order.
    pub async fn drain_due(&self, now: &DateTime<Tz>) -> Vec<ScheduledItem> {
        let mut state = self.state.lock().await;
        let mut due = Vec::new();
        while state.heap.peek().is_some_and(|entry| entry.item.is_due(now)) {
            if let Some(entry) = state.heap.pop() {
                due.push(entry.item);
            }
        }
        due
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.heap.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.heap.is_empty()
    }

    /// Earliest pending `scheduled_at`, if any.
    pub async fn next_due_at(&self) -> Option<DateTime<Tz>> {
        let state = self.state.lock().await;
        state.heap.peek().map(|entry| entry.item.scheduled_at())
    }

    /// Copy of the pending items in insertion order.
    pub async fn snapshot(&self) -> Vec<ScheduledItem> {
        let state = self.state.lock().await;
        let mut entries: Vec<&PendingEntry> = state.heap.iter().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.item.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone};
    use ulid::Ulid;

    use super::*;
    use crate::domain::{FormPayload, ItemId};

    fn now() -> DateTime<Tz> {
        chrono_tz::Europe::Amsterdam
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .unwrap()
    }

    fn item(label: &str, scheduled_at: DateTime<Tz>) -> ScheduledItem {
        ScheduledItem::new(
            ItemId::from(Ulid::new()),
            FormPayload::from_pairs([("label", label)]),
            scheduled_at,
            now(),
        )
    }

    fn labels(items: &[ScheduledItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| i.payload().get("label").unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn past_items_are_drained_and_removed() {
        let store = PendingStore::new();
        store.enqueue(item("a", now() - TimeDelta::seconds(10))).await;
        store.enqueue(item("b", now() - TimeDelta::hours(3))).await;

        let due = store.drain_due(&now()).await;
        assert_eq!(due.len(), 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn future_items_stay_put() {
        let store = PendingStore::new();
        store.enqueue(item("later", now() + TimeDelta::seconds(1))).await;
        store.enqueue(item("much-later", now() + TimeDelta::hours(1))).await;

        let due = store.drain_due(&now()).await;
        assert!(due.is_empty());
        assert_eq!(store.len().await, 2);
        assert_eq!(labels(&store.snapshot().await), vec!["later", "much-later"]);
    }

    #[tokio::test]
    async fn exactly_now_is_due() {
        let store = PendingStore::new();
        store.enqueue(item("boundary", now())).await;

        let due = store.drain_due(&now()).await;
        assert_eq!(labels(&due), vec!["boundary"]);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn mixed_batch_is_partitioned() {
        let store = PendingStore::new();
        store.enqueue(item("future", now() + TimeDelta::minutes(5))).await;
        store.enqueue(item("past", now() - TimeDelta::minutes(5))).await;
        store.enqueue(item("boundary", now())).await;

        let due = store.drain_due(&now()).await;
        assert_eq!(labels(&due), vec!["past", "boundary"]);
        assert_eq!(labels(&store.snapshot().await), vec!["future"]);
        assert_eq!(store.next_due_at().await, Some(now() + TimeDelta::minutes(5)));
    }

    #[tokio::test]
    async fn second_drain_is_empty() {
        let store = PendingStore::new();
        store.enqueue(item("a", now() - TimeDelta::seconds(1))).await;
        store.enqueue(item("b", now() + TimeDelta::hours(1))).await;

        assert_eq!(store.drain_due(&now()).await.len(), 1);
        assert!(store.drain_due(&now()).await.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn simultaneous_items_drain_in_enqueue_order() {
        let store = PendingStore::new();
        for label in ["first", "second", "third"] {
            store.enqueue(item(label, now())).await;
        }

        let due = store.drain_due(&now()).await;
        assert_eq!(labels(&due), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn snapshot_is_in_insertion_order() {
        let store = PendingStore::new();
        store.enqueue(item("late", now() + TimeDelta::hours(2))).await;
        store.enqueue(item("early", now() + TimeDelta::hours(1))).await;

        assert_eq!(labels(&store.snapshot().await), vec!["late", "early"]);
        assert_eq!(store.next_due_at().await, Some(now() + TimeDelta::hours(1)));
        // snapshot does not consume
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn empty_store_has_no_next_due() {
        let store = PendingStore::new();
        assert_eq!(store.next_due_at().await, None);
        assert!(store.drain_due(&now()).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enqueues_are_not_lost() {
        const N: usize = 200;
        let store = Arc::new(PendingStore::new());

        let mut joins = Vec::with_capacity(N);
        for i in 0..N {
            let store = Arc::clone(&store);
            joins.push(tokio::spawn(async move {
                store
                    .enqueue(item(&format!("item-{i}"), now() + TimeDelta::minutes(1)))
                    .await;
            }));
        }
        for join in joins {
            join.await.unwrap();
        }

        assert_eq!(store.len().await, N);
        let distinct: HashSet<String> = labels(&store.snapshot().await).into_iter().collect();
        assert_eq!(distinct.len(), N);
    }
}
