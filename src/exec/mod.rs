// src/exec/mod.rs

//! Task execution backends.
//!
//! The scheduler hands each selected task to a [`TaskRunner`]. Executing a
//! task has no side effects of its own in this crate, so the production
//! runner ([`NoopRunner`]) simply reports success; tests plug in runners that
//! fail on purpose to exercise the fail-closed path.

pub mod runner;

pub use runner::{NoopRunner, TaskRunner};
