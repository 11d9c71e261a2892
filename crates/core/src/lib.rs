//! Core domain types for Taskweave.
//!
//! This crate holds the task, event, and pipeline data model shared by the
//! store, the orchestrator, and the HTTP boundary. It contains no I/O.

pub mod domain;

pub use domain::*;
