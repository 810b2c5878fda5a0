//! Outcome of one send attempt.
//!
//! Recorded in logs and tick reports. The dispatch loop never inspects it to
//! decide anything: every attempted item is consumed.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The downstream answered with a 2xx status.
    Delivered { status: u16 },

    /// The downstream answered with a non-2xx status.
    Rejected { status: u16 },

    /// No usable response.
    Failed(FailureReason),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Delivered { status } => write!(f, "delivered (status {status})"),
            DeliveryOutcome::Rejected { status } => write!(f, "rejected (status {status})"),
            DeliveryOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Reasons why an attempt produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    Network(String),
    /// The request could not be built (encoding, bad header value).
    Request(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "request timed out"),
            FailureReason::Network(msg) => write!(f, "network error: {msg}"),
            FailureReason::Request(msg) => write!(f, "request error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_counts_as_delivered() {
        assert!(DeliveryOutcome::Delivered { status: 204 }.is_delivered());
        assert!(!DeliveryOutcome::Rejected { status: 503 }.is_delivered());
        assert!(!DeliveryOutcome::Failed(FailureReason::Timeout).is_delivered());
    }

    #[test]
    fn display_is_log_friendly() {
        assert_eq!(
            DeliveryOutcome::Rejected { status: 404 }.to_string(),
            "rejected (status 404)"
        );
        assert_eq!(
            DeliveryOutcome::Failed(FailureReason::Network("connection refused".into())).to_string(),
            "failed: network error: connection refused"
        );
    }
}
