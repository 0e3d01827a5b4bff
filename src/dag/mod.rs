// src/dag/mod.rs

//! Dependency graph and scheduling.
//!
//! - [`resolver`] answers graph questions (cycles, order, dependents) over a
//!   borrowed task map.
//! - [`queue`] holds the candidates eligible to run, ordered at pop time.
//! - [`scheduler`] owns the tasks and drives admission, execution and the
//!   lifecycle state machine.

use std::collections::BTreeMap;

use crate::task::Task;
use crate::types::TaskId;

pub mod queue;
pub mod resolver;
pub mod scheduler;

pub use queue::{AdmissionQueue, QueueEntry};
pub use resolver::DependencyResolver;
pub use scheduler::{SchedulerStats, TaskScheduler};

/// Canonical identity -> task map, ordered by identity.
pub type TaskMap = BTreeMap<TaskId, Task>;
