// src/dag/queue.rs

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::task::Task;
use crate::types::{Priority, TaskId};

/// A queued candidate.
///
/// Priority and deadline are copied in at enqueue time (both are immutable
/// on the task). Overdue-ness is not: it is derived against the clock each
/// time the queue is asked for its best entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: TaskId,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    seq: u64,
}

impl QueueEntry {
    fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// `Less` means `self` should run before `other`.
    ///
    /// 1. higher priority first
    /// 2. on-time before overdue
    /// 3. earlier deadline first; a deadline beats no deadline
    /// 4. first enqueued first
    fn run_order(&self, other: &Self, now: DateTime<Utc>) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.is_overdue(now).cmp(&other.is_overdue(now)))
            .then_with(|| match (self.deadline, other.deadline) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Admission queue of tasks currently believed eligible to run.
///
/// This is a multiset: pushing the same identity twice keeps two entries.
/// The scheduler only pushes a task when it first becomes eligible, and
/// discards stale entries on pop.
///
/// Because overdue status moves with wall-clock time, ordering is evaluated
/// at selection time rather than fixed in a heap.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    entries: Vec<QueueEntry>,
    next_seq: u64,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn push(&mut self, task: &Task) {
        let entry = QueueEntry {
            id: task.id().to_string(),
            priority: task.priority(),
            deadline: task.deadline(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        debug!(task = %entry.id, priority = %entry.priority, "enqueued");
        self.entries.push(entry);
    }

    /// Best entry at `now`, without removing it.
    pub fn peek(&self, now: DateTime<Utc>) -> Option<&QueueEntry> {
        self.entries.iter().min_by(|a, b| a.run_order(b, now))
    }

    /// Remove and return the best entry at `now`.
    pub fn pop(&mut self, now: DateTime<Utc>) -> Option<QueueEntry> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.run_order(b, now))
            .map(|(idx, _)| idx)?;

        Some(self.entries.swap_remove(idx))
    }

    /// Drop every entry for `id`. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before - self.entries.len()
    }

    /// Identities in the order they would be popped at `now`.
    pub fn ordered_ids(&self, now: DateTime<Utc>) -> Vec<TaskId> {
        let mut entries: Vec<&QueueEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.run_order(b, now));
        entries.into_iter().map(|e| e.id.clone()).collect()
    }
}
