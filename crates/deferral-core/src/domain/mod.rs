//! Domain model (ids, payloads, items, states, outcomes, time zone).
//!
//! Nothing in here knows about locks, timers, or HTTP. These are the values
//! that flow between the intake, the store, and the dispatch loop.

pub mod ids;
pub mod item;
pub mod outcome;
pub mod payload;
pub mod state;
pub mod zone;

pub use ids::ItemId;
pub use item::ScheduledItem;
pub use outcome::{DeliveryOutcome, FailureReason};
pub use payload::FormPayload;
pub use state::ItemState;
pub use zone::{CanonicalZone, DEFAULT_ZONE_NAME, SCHEDULE_TIME_FORMAT};
