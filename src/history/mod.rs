//! Rolling price history
//!
//! Keeps a bounded, chronological sequence of samples per symbol.

mod clock;
mod store;

pub use clock::{Clock, ManualClock, SessionClock};
pub use store::{local_time, HistoryStore, Sample, DEFAULT_MAX_SAMPLES, INVALID_DATE};
