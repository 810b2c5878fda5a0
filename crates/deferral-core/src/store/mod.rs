//! Store module: the pending-item collection shared by intake and dispatch.

mod pending;

pub use pending::PendingStore;
