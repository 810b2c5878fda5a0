use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeferralError {
    #[error("schedule_time field is missing")]
    MissingScheduleTime,

    #[error("invalid schedule_time {value:?}: {reason}")]
    InvalidScheduleTime { value: String, reason: String },

    #[error("invalid form body: {0}")]
    InvalidForm(String),

    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("clock unavailable: {0}")]
    Clock(String),

    #[error("sink setup failed: {0}")]
    Sink(String),
}

impl DeferralError {
    /// Errors caused by the caller's input. The request is rejected and
    /// nothing reaches the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DeferralError::MissingScheduleTime
                | DeferralError::InvalidScheduleTime { .. }
                | DeferralError::InvalidForm(_)
        )
    }

    /// Errors the dispatch loop shrugs off: the tick is skipped and the next
    /// one tries again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DeferralError::Clock(_))
    }
}
