// src/engine/mod.rs

//! Concurrent access to a scheduler.
//!
//! [`TaskScheduler`](crate::dag::TaskScheduler) is a plain single-owner
//! struct. When several async callers need it, [`SchedulerService`] moves it
//! into a Tokio task and processes requests from [`SchedulerHandle`]s one at a
//! time, so an insertion with rollback or an execution with its cascade is
//! always applied as a whole before the next request is looked at.

pub mod service;

pub use service::{SchedulerHandle, SchedulerRequest, SchedulerService};
