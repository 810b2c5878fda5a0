//! Sink port - where due items go
//!
//! The dispatch loop calls `send` once per due item and moves on. It does
//! not look inside the outcome beyond logging and counting it.

use async_trait::async_trait;

use crate::domain::{DeliveryOutcome, FormPayload};

/// Delivery capability for due payloads.
///
/// 普通の失敗で panic しないこと（`DeliveryOutcome::Failed` で返す）。
/// Sends for one batch may run concurrently.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn send(&self, payload: &FormPayload) -> DeliveryOutcome;
}
