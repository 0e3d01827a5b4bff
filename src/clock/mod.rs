// src/clock/mod.rs

//! Time source used for deadlines and execution timestamps.
//!
//! The scheduler never calls `Utc::now()` directly; it asks its [`Clock`].
//! Tests swap in [`mock::ManualClock`] to make overdue ordering and measured
//! durations deterministic.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

pub mod mock;

/// Abstract wall-clock interface.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Implementation backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
