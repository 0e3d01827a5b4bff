#![allow(dead_code)]

use std::collections::BTreeMap;

use taskdag::config::{DefaultSection, PlanFile, RawPlanFile, TaskConfig};
use taskdag::task::TaskSpec;
use taskdag::types::Priority;

/// Builder for `PlanFile` to simplify test setup.
pub struct PlanBuilder {
    plan: RawPlanFile,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            plan: RawPlanFile {
                default: DefaultSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, id: &str, task: TaskConfig) -> Self {
        self.plan.task.insert(id.to_string(), task);
        self
    }

    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.plan.default.priority = Some(priority);
        self
    }

    pub fn with_default_assignee(mut self, assignee: &str) -> Self {
        self.plan.default.assignee = Some(assignee.to_string());
        self
    }

    pub fn raw(self) -> RawPlanFile {
        self.plan
    }

    pub fn build(self) -> PlanFile {
        PlanFile::try_from(self.plan).expect("Failed to build valid plan from builder")
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskConfig {
                name: name.to_string(),
                description: String::new(),
                priority: None,
                assignee: None,
                deadline: None,
                after: vec![],
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.task.priority = Some(priority);
        self
    }

    pub fn assignee(mut self, assignee: &str) -> Self {
        self.task.assignee = Some(assignee.to_string());
        self
    }

    pub fn deadline(mut self, deadline: &str) -> Self {
        self.task.deadline = Some(deadline.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.task.description = description.to_string();
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// Spec with a generated name and assignee `"dev"`, depending on `deps`.
pub fn spec(id: &str, priority: Priority, deps: &[&str]) -> TaskSpec {
    deps.iter().fold(
        TaskSpec::new(id, format!("Task {id}"), "dev").priority(priority),
        |spec, dep| spec.after(*dep),
    )
}
