//! Event system for Consilium
//!
//! This crate provides the event bus and event types for real-time
//! visibility into running analysis jobs.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
