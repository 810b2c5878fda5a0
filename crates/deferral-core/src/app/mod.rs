//! App - application layer
//!
//! Combines the ports and the store into the running service.
//!
//! # Components
//! - **Intake**: validates submitted forms and enqueues items
//! - **DispatchLoop**: ticks, drains due items, sends them once
//! - **PendingView**: read-only listing of what is still waiting

pub mod dispatch_loop;
pub mod intake;
pub mod status;

pub use self::dispatch_loop::{
    DEFAULT_POLL_INTERVAL, DispatchHandle, DispatchLoop, MIN_POLL_INTERVAL, TickReport,
};
pub use self::intake::{Intake, SCHEDULE_TIME_FIELD};
pub use self::status::{PendingItemView, PendingView};
