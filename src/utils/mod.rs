//! Utility functions and helpers.

pub mod time;

pub use time::{Clock, FixedClock, SystemClock};
