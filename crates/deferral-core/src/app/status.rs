//! Status - read-only views of the pending store

use serde::Serialize;

use crate::domain::{FormPayload, ItemState, ScheduledItem};
use crate::store::PendingStore;

/// One pending item as shown by `GET /pending`.
#[derive(Debug, Clone, Serialize)]
pub struct PendingItemView {
    pub id: String,
    pub state: ItemState,
    /// RFC 3339, canonical zone offset.
    pub scheduled_at: String,
    pub enqueued_at: String,
    pub fields: FormPayload,
}

impl From<&ScheduledItem> for PendingItemView {
    fn from(item: &ScheduledItem) -> Self {
        Self {
            id: item.id().to_string(),
            state: ItemState::Pending,
            scheduled_at: item.scheduled_at().to_rfc3339(),
            enqueued_at: item.enqueued_at().to_rfc3339(),
            fields: item.payload().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingView {
    pub count: usize,
    pub next_due_at: Option<String>,
    pub items: Vec<PendingItemView>,
}

impl PendingView {
    /// Snapshot the store (one lock acquisition). Items are listed in
    /// insertion order; `count` and `next_due_at` come from the same
    /// snapshot.
    pub async fn collect(store: &PendingStore) -> Self {
        let snapshot = store.snapshot().await;
        let next_due_at = snapshot
            .iter()
            .map(ScheduledItem::scheduled_at)
            .min()
            .map(|at| at.to_rfc3339());

        Self {
            count: snapshot.len(),
            next_due_at,
            items: snapshot.iter().map(PendingItemView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemId;
    use chrono::{DateTime, TimeDelta, TimeZone};
    use chrono_tz::Tz;
    use ulid::Ulid;

    fn now() -> DateTime<Tz> {
        chrono_tz::Europe::Amsterdam
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn empty_store_view() {
        let view = PendingView::collect(&PendingStore::new()).await;
        assert_eq!(view.count, 0);
        assert!(view.next_due_at.is_none());
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn view_lists_items_and_earliest_due_time() {
        let store = PendingStore::new();
        for (label, offset) in [("late", 2), ("early", 1)] {
            store
                .enqueue(ScheduledItem::new(
                    ItemId::from(Ulid::new()),
                    FormPayload::from_pairs([("label", label)]),
                    now() + TimeDelta::hours(offset),
                    now(),
                ))
                .await;
        }

        let view = PendingView::collect(&store).await;

        assert_eq!(view.count, 2);
        assert_eq!(view.next_due_at.as_deref(), Some("2024-06-01T13:00:00+02:00"));
        assert_eq!(view.items[0].fields.get("label"), Some("late"));
        assert_eq!(view.items[1].scheduled_at, "2024-06-01T13:00:00+02:00");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"][0]["state"], "pending");
        assert_eq!(json["items"][0]["fields"], serde_json::json!([["label", "late"]]));
        assert!(json["items"][0]["id"].as_str().unwrap().starts_with("item-"));
    }
}
