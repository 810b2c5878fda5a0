//! Item state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle of a single item.
///
/// State transitions:
/// - Pending -> Due (its time has come; observed by a dispatch scan)
/// - Due -> Dispatching (drained from the store, send in flight)
/// - Dispatching -> Terminal (send finished, whatever the outcome)
///
/// Nothing ever goes back to Pending: there are no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    Due,
    Dispatching,
    Terminal,
}

impl ItemState {
    pub fn can_transition_to(self, next: ItemState) -> bool {
        matches!(
            (self, next),
            (ItemState::Pending, ItemState::Due)
                | (ItemState::Due, ItemState::Dispatching)
                | (ItemState::Dispatching, ItemState::Terminal)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(ItemState::Pending.can_transition_to(ItemState::Due));
        assert!(ItemState::Due.can_transition_to(ItemState::Dispatching));
        assert!(ItemState::Dispatching.can_transition_to(ItemState::Terminal));
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in [
            ItemState::Pending,
            ItemState::Due,
            ItemState::Dispatching,
            ItemState::Terminal,
        ] {
            assert!(!from.can_transition_to(ItemState::Pending));
        }
        assert!(!ItemState::Terminal.can_transition_to(ItemState::Due));
        assert!(!ItemState::Pending.can_transition_to(ItemState::Dispatching));
    }
}
