//! Intake - turns submitted forms into scheduled items
//!
//! The HTTP layer hands over the raw form; the intake validates
//! `schedule_time`, builds the item, and enqueues it. Malformed input never
//! reaches the store.

use std::sync::Arc;

use tracing::info;

use crate::domain::{CanonicalZone, FormPayload, ItemId, ScheduledItem};
use crate::error::DeferralError;
use crate::ports::{Clock, IdGenerator, UlidGenerator};
use crate::store::PendingStore;

/// Form field that carries the schedule time. It stays in the payload, so
/// the downstream receives exactly what was submitted.
pub const SCHEDULE_TIME_FIELD: &str = "schedule_time";

pub struct Intake {
    store: Arc<PendingStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    zone: CanonicalZone,
}

impl Intake {
    pub fn new(store: Arc<PendingStore>, clock: Arc<dyn Clock>, zone: CanonicalZone) -> Self {
        Self {
            store,
            clock,
            ids: Arc::new(UlidGenerator::new()),
            zone,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &Arc<PendingStore> {
        &self.store
    }

    pub fn zone(&self) -> CanonicalZone {
        self.zone
    }

    /// Validate and build an item without enqueueing it.
    ///
    /// Uses the first `schedule_time` value if the field is repeated.
    pub fn build_item(&self, payload: FormPayload) -> Result<ScheduledItem, DeferralError> {
        let raw = payload
            .get(SCHEDULE_TIME_FIELD)
            .ok_or(DeferralError::MissingScheduleTime)?;
        let scheduled_at = self.zone.parse_schedule_time(raw)?;
        let enqueued_at = self.clock.now()?;
        let id = self.ids.generate_item_id(&enqueued_at);
        Ok(ScheduledItem::new(id, payload, scheduled_at, enqueued_at))
    }

    /// Validate, build, and enqueue.
    pub async fn submit(&self, payload: FormPayload) -> Result<ItemId, DeferralError> {
        let item = self.build_item(payload)?;
        let id = item.id();
        let scheduled_at = item.scheduled_at();
        let overdue = item.is_due(&item.enqueued_at());

        self.store.enqueue(item).await;
        info!(item = %id, %scheduled_at, overdue, "item scheduled");
        Ok(id)
    }

    /// Decode a urlencoded body, then `submit`.
    pub async fn submit_form(&self, body: &str) -> Result<ItemId, DeferralError> {
        let payload = FormPayload::decode(body)?;
        self.submit(payload).await
    }
}
