//! Receiver loop and message handling.
//!
//! This module contains the main receiver structure and the tracking core it
//! feeds.

pub mod core;
pub mod handlers;

pub use core::TrackerServer;
pub use handlers::{MessageOutcome, Tracker, TrackerStats};
