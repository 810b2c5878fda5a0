//! Impls - sink implementations
//!
//! - **HttpSink**: the production sink (reqwest, fixed endpoint and headers)
//! - **RecordingSink**: records payloads instead of sending them; used by
//!   tests and `--dry-run`

pub mod http_sink;
pub mod recording_sink;

pub use self::http_sink::{HttpSink, HttpSinkConfig};
pub use self::recording_sink::RecordingSink;
