// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::task::TaskSpec;
use crate::types::Priority;

/// Top-level plan as read from a TOML file, before validation.
///
/// ```toml
/// [default]
/// priority = "medium"
/// assignee = "ops"
///
/// [task.BUILD]
/// name = "Build release"
/// after = ["DESIGN"]
/// deadline = "2026-10-16 18:00"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanFile {
    /// Fallbacks from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All tasks from `[task.<id>]`, keyed by task identity.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Priority for tasks that do not set one. If `None`, tasks default to
    /// medium.
    #[serde(default)]
    pub priority: Option<Priority>,

    /// Assignee for tasks that do not set one.
    #[serde(default)]
    pub assignee: Option<String>,
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: Option<Priority>,

    /// Falls back to `default.assignee`.
    #[serde(default)]
    pub assignee: Option<String>,

    /// RFC 3339 timestamp, or `"YYYY-MM-DD HH:MM"` in local time.
    #[serde(default)]
    pub deadline: Option<String>,

    /// Dependency list: this task waits for every task listed here.
    #[serde(default)]
    pub after: Vec<String>,
}

impl TaskConfig {
    pub fn effective_priority(&self, default: &DefaultSection) -> Option<Priority> {
        self.priority.or(default.priority)
    }

    pub fn effective_assignee<'a>(&'a self, default: &'a DefaultSection) -> Option<&'a str> {
        self.assignee.as_deref().or(default.assignee.as_deref())
    }
}

/// A validated plan.
///
/// Only obtainable through `TryFrom<RawPlanFile>`, so holding one means the
/// plan has tasks, every `after` resolves, there are no cycles and every
/// deadline parses.
#[derive(Debug, Clone)]
pub struct PlanFile {
    pub default: DefaultSection,
    pub task: BTreeMap<String, TaskConfig>,
    specs: Vec<TaskSpec>,
}

impl PlanFile {
    pub(crate) fn new_unchecked(
        default: DefaultSection,
        task: BTreeMap<String, TaskConfig>,
        specs: Vec<TaskSpec>,
    ) -> Self {
        Self {
            default,
            task,
            specs,
        }
    }

    /// Task specs in an order where each task comes after all of its
    /// dependencies, so they can be admitted one by one.
    pub fn task_specs(&self) -> &[TaskSpec] {
        &self.specs
    }
}
