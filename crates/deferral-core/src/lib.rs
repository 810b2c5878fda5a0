//! deferral-core
//!
//! Core building blocks for the deferral scheduler: form posts are accepted
//! with a `schedule_time`, held in memory, and forwarded downstream once that
//! time has passed.
//!
//! # Modules
//! - **domain**: items, payloads, ids, the canonical time zone, outcomes
//! - **ports**: seams to the outside world (`Clock`, `IdGenerator`, `Sink`)
//! - **store**: `PendingStore`, the only shared mutable state
//! - **app**: `DispatchLoop`, `Intake`, pending-item status views
//! - **impls**: `HttpSink` (reqwest) and `RecordingSink` (tests, dry runs)
//!
//! # Delivery policy
//! Best-effort, at-most-once. Every due item gets exactly one send attempt
//! and is discarded afterwards, whatever the outcome. Nothing survives a
//! restart.

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod store;

pub use crate::app::{DispatchHandle, DispatchLoop, Intake, TickReport};
pub use crate::domain::{
    CanonicalZone, DeliveryOutcome, FailureReason, FormPayload, ItemId, ItemState, ScheduledItem,
};
pub use crate::error::DeferralError;
pub use crate::store::PendingStore;
