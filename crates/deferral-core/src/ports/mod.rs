//! Ports - seams to the outside world
//!
//! Each trait hides something the core does not own: the passage of time,
//! id generation, and the downstream HTTP target.

pub mod clock;
pub mod id_generator;
pub mod sink;

pub use self::clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::sink::Sink;
