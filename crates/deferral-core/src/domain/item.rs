//! Scheduled items.

use chrono::DateTime;
use chrono_tz::Tz;

use super::{FormPayload, ItemId};

/// A form post waiting for its time.
///
/// Design:
/// - Immutable once built: no setters, fields are private.
/// - The only thing that changes is membership in the `PendingStore`.
/// - Both timestamps are already normalized to the canonical zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledItem {
    id: ItemId,
    payload: FormPayload,
    scheduled_at: DateTime<Tz>,
    enqueued_at: DateTime<Tz>,
}

impl ScheduledItem {
    pub fn new(
        id: ItemId,
        payload: FormPayload,
        scheduled_at: DateTime<Tz>,
        enqueued_at: DateTime<Tz>,
    ) -> Self {
        Self {
            id,
            payload,
            scheduled_at,
            enqueued_at,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn payload(&self) -> &FormPayload {
        &self.payload
    }

    pub fn scheduled_at(&self) -> DateTime<Tz> {
        self.scheduled_at
    }

    pub fn enqueued_at(&self) -> DateTime<Tz> {
        self.enqueued_at
    }

    /// Due means `scheduled_at <= now`. The boundary is inclusive.
    pub fn is_due(&self, now: &DateTime<Tz>) -> bool {
        self.scheduled_at <= *now
    }
}
