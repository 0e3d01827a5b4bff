// src/config/validate.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{PlanFile, RawPlanFile};
use crate::errors::{Result, TaskDagError};
use crate::task::TaskSpec;

const LOCAL_DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

impl TryFrom<RawPlanFile> for PlanFile {
    type Error = TaskDagError;

    fn try_from(raw: RawPlanFile) -> std::result::Result<Self, Self::Error> {
        let specs = validate_raw_plan(&raw)?;
        Ok(PlanFile::new_unchecked(raw.default, raw.task, specs))
    }
}

/// Parse a deadline string.
///
/// Accepts RFC 3339 (`2026-10-16T18:00:00Z`) or `YYYY-MM-DD HH:MM`, the
/// latter read as local time.
pub fn parse_deadline(s: &str) -> Result<DateTime<Utc>> {
    parse_deadline_str(s).map_err(TaskDagError::ConfigError)
}

fn parse_deadline_str(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, LOCAL_DEADLINE_FORMAT).map_err(|e| {
        format!("invalid deadline '{s}': {e} (expected RFC 3339 or \"YYYY-MM-DD HH:MM\")")
    })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("deadline '{s}' does not exist in local time"))
}

fn validate_raw_plan(plan: &RawPlanFile) -> Result<Vec<TaskSpec>> {
    ensure_has_tasks(plan)?;
    validate_task_fields(plan)?;
    validate_task_dependencies(plan)?;
    let order = dependency_order(plan)?;
    build_specs(plan, &order)
}

fn ensure_has_tasks(plan: &RawPlanFile) -> Result<()> {
    if plan.task.is_empty() {
        return Err(TaskDagError::ConfigError(
            "plan must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_fields(plan: &RawPlanFile) -> Result<()> {
    for (id, task) in plan.task.iter() {
        if id.trim().is_empty() {
            return Err(TaskDagError::ConfigError(
                "task ids cannot be blank".to_string(),
            ));
        }
        if task.name.trim().is_empty() {
            return Err(TaskDagError::ConfigError(format!(
                "task '{id}' has an empty `name`"
            )));
        }
        match task.effective_assignee(&plan.default) {
            Some(a) if !a.trim().is_empty() => {}
            _ => {
                return Err(TaskDagError::ConfigError(format!(
                    "task '{id}' has no `assignee` and [default] does not set one"
                )));
            }
        }
    }
    Ok(())
}

fn validate_task_dependencies(plan: &RawPlanFile) -> Result<()> {
    for (id, task) in plan.task.iter() {
        for dep in task.after.iter() {
            if !plan.task.contains_key(dep) {
                return Err(TaskDagError::ConfigError(format!(
                    "task '{id}' has unknown dependency '{dep}' in `after`"
                )));
            }
            if dep == id {
                return Err(TaskDagError::ConfigError(format!(
                    "task '{id}' cannot depend on itself in `after`"
                )));
            }
        }
    }
    Ok(())
}

/// Topological order of the whole plan.
///
/// Edge direction: dep -> task. For
///
/// ```toml
/// [task.B]
/// after = ["A"]
/// ```
///
/// we add edge A -> B.
fn dependency_order(plan: &RawPlanFile) -> Result<Vec<String>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in plan.task.keys() {
        graph.add_node(id.as_str());
    }

    for (id, task) in plan.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(TaskDagError::CycleDetected(cycle.node_id().to_string())),
    }
}

fn build_specs(plan: &RawPlanFile, order: &[String]) -> Result<Vec<TaskSpec>> {
    let mut by_id: BTreeMap<&str, TaskSpec> = BTreeMap::new();

    for (id, task) in plan.task.iter() {
        let deadline = task
            .deadline
            .as_deref()
            .map(parse_deadline_str)
            .transpose()
            .map_err(|e| TaskDagError::ConfigError(format!("task '{id}': {e}")))?;

        let spec = TaskSpec {
            id: id.clone(),
            name: task.name.clone(),
            description: task.description.clone(),
            priority: task.effective_priority(&plan.default),
            dependencies: task.after.iter().cloned().collect(),
            assignee: task
                .effective_assignee(&plan.default)
                .unwrap_or_default()
                .to_string(),
            deadline,
        };
        by_id.insert(id.as_str(), spec);
    }

    Ok(order
        .iter()
        .filter_map(|id| by_id.remove(id.as_str()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(toml_src: &str) -> RawPlanFile {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn specs_come_out_dependencies_first() {
        let plan = PlanFile::try_from(raw(
            r#"
[default]
assignee = "ops"

[task.deploy]
name = "Deploy"
after = ["test"]

[task.test]
name = "Test"
after = ["build"]

[task.build]
name = "Build"
"#,
        ))
        .unwrap();

        let ids: Vec<&str> = plan.task_specs().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["build", "test", "deploy"]);
        assert!(plan.task_specs().iter().all(|s| s.assignee == "ops"));
    }

    #[test]
    fn cycle_is_reported() {
        let err = PlanFile::try_from(raw(
            r#"
[task.A]
name = "A"
assignee = "x"
after = ["B"]

[task.B]
name = "B"
assignee = "x"
after = ["A"]
"#,
        ))
        .unwrap_err();

        match err {
            TaskDagError::CycleDetected(id) => assert!(id == "A" || id == "B"),
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn missing_assignee_is_a_config_error() {
        let err = PlanFile::try_from(raw(
            r#"
[task.A]
name = "A"
"#,
        ))
        .unwrap_err();
        assert!(matches!(err, TaskDagError::ConfigError(ref m) if m.contains("assignee")));
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = PlanFile::try_from(raw("")).unwrap_err();
        assert!(matches!(err, TaskDagError::ConfigError(ref m) if m.contains("at least one")));
    }

    #[test]
    fn parses_rfc3339_and_local_deadlines() {
        let utc = parse_deadline("2026-10-16T18:00:00Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-10-16T18:00:00+00:00");

        let offset = parse_deadline("2026-10-16T20:00:00+02:00").unwrap();
        assert_eq!(offset, utc);

        assert!(parse_deadline("2026-10-16 18:00").is_ok());
        assert!(matches!(
            parse_deadline("tomorrow"),
            Err(TaskDagError::ConfigError(_))
        ));
    }

    #[test]
    fn bad_deadline_names_the_task() {
        let err = PlanFile::try_from(raw(
            r#"
[task.A]
name = "A"
assignee = "x"
deadline = "soon"
"#,
        ))
        .unwrap_err();
        assert!(matches!(err, TaskDagError::ConfigError(ref m) if m.contains("task 'A'")));
    }
}
