//! RecordingSink - in-memory sink for tests and dry runs
//!
//! Records every payload it is handed and answers `Delivered` unless a rule
//! says otherwise. `log_only()` keeps nothing in memory (long-running dry
//! runs).

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{DeliveryOutcome, FailureReason, FormPayload};
use crate::ports::Sink;

#[derive(Debug, Clone)]
enum Rule {
    Fail,
    Reject(u16),
}

#[derive(Debug)]
pub struct RecordingSink {
    sent: Mutex<Vec<FormPayload>>,
    retain: bool,
    /// (key, value, rule): first matching field decides the outcome.
    rules: Mutex<Vec<(String, String, Rule)>>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            retain: true,
            rules: Mutex::new(Vec::new()),
        }
    }

    /// Log each payload and drop it; `sent()` stays empty.
    pub fn log_only() -> Self {
        Self {
            retain: false,
            ..Self::new()
        }
    }

    /// Answer `Failed(Network)` for payloads carrying `key=value`.
    pub async fn fail_when(&self, key: impl Into<String>, value: impl Into<String>) {
        self.rules
            .lock()
            .await
            .push((key.into(), value.into(), Rule::Fail));
    }

    /// Answer `Rejected { status }` for payloads carrying `key=value`.
    pub async fn reject_when(&self, key: impl Into<String>, value: impl Into<String>, status: u16) {
        self.rules
            .lock()
            .await
            .push((key.into(), value.into(), Rule::Reject(status)));
    }

    /// Every payload handed to `send`, failed ones included. Empty for a
    /// `log_only()` sink.
    pub async fn sent(&self) -> Vec<FormPayload> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn send(&self, payload: &FormPayload) -> DeliveryOutcome {
        if self.retain {
            self.sent.lock().await.push(payload.clone());
        }

        let rules = self.rules.lock().await;
        let matched = rules
            .iter()
            .find(|(key, value, _)| payload.get_all(key).any(|v| v == value))
            .map(|(_, _, rule)| rule.clone());

        let outcome = match matched {
            Some(Rule::Fail) => {
                DeliveryOutcome::Failed(FailureReason::Network("simulated failure".to_string()))
            }
            Some(Rule::Reject(status)) => DeliveryOutcome::Rejected { status },
            None => DeliveryOutcome::Delivered { status: 200 },
        };
        info!(?payload, %outcome, "payload recorded, not sent");
        outcome
    }
}
