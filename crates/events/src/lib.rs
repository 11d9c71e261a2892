//! In-process event system for Taskweave.
//!
//! This crate provides the broadcast bus used to push task lifecycle
//! changes and appended agent events to live subscribers.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
