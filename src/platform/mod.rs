//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Time (wall clock vs. scripted clock for tests)

pub mod time;

pub use time::{Clock, ManualClock, SystemClock};
