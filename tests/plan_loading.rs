// tests/plan_loading.rs

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use taskdag::clock::mock::ManualClock;
use taskdag::config::{PlanFile, load_and_validate};
use taskdag::dag::TaskScheduler;
use taskdag::errors::TaskDagError;
use taskdag::types::Priority;
use taskdag_test_utils::builders::{PlanBuilder, TaskConfigBuilder};
use taskdag_test_utils::{epoch, init_tracing};

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/release_pipeline.toml")
}

fn write_plan(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn release_pipeline_demo_runs_hotfix_first() {
    init_tracing();
    let plan = load_and_validate(demo_path()).unwrap();
    assert_eq!(plan.task_specs().len(), 7);

    let mut s = TaskScheduler::new().with_clock(ManualClock::new(epoch()));
    for spec in plan.task_specs() {
        s.add_task(spec.clone()).unwrap();
    }

    let order: Vec<String> = s
        .execute_all()
        .unwrap()
        .into_iter()
        .map(|t| t.id().to_string())
        .collect();

    assert_eq!(
        order,
        vec![
            "HOTFIX-001",
            "DESIGN-001",
            "BACKEND-001",
            "FRONTEND-001",
            "TESTING-001",
            "UAT-001",
            "DEPLOY-001",
        ]
    );
    assert_eq!(s.team_workload().len(), 7);
}

#[test]
fn defaults_fill_missing_priority_and_assignee() {
    let file = write_plan(
        r#"
[default]
priority = "high"
assignee = "ops"

[task.build]
name = "Build"

[task.ship]
name = "Ship"
priority = "low"
assignee = "release"
after = ["build"]
"#,
    );

    let plan = load_and_validate(file.path()).unwrap();
    let specs = plan.task_specs();
    assert_eq!(specs[0].id, "build");
    assert_eq!(specs[0].priority, Some(Priority::High));
    assert_eq!(specs[0].assignee, "ops");
    assert_eq!(specs[1].priority, Some(Priority::Low));
    assert_eq!(specs[1].assignee, "release");
}

#[test]
fn plan_cycle_returns_structured_error() {
    let file = write_plan(
        r#"
[default]
assignee = "ops"

[task.A]
name = "A"
after = ["B"]

[task.B]
name = "B"
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskDagError::CycleDetected(id)) => assert!(id == "A" || id == "B"),
        Err(e) => panic!("Expected CycleDetected, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_dependency_returns_config_error() {
    let file = write_plan(
        r#"
[task.A]
name = "A"
assignee = "ops"
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskDagError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_and_missing_file_are_reported() {
    let file = write_plan("[task.A\nname = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TaskDagError::TomlError(_))
    ));

    assert!(matches!(
        load_and_validate("/definitely/not/here/Taskdag.toml"),
        Err(TaskDagError::IoError(_))
    ));
}

#[test]
fn builder_plans_admit_in_dependency_order() {
    let plan: PlanFile = PlanBuilder::new()
        .with_default_assignee("dev")
        .with_task("deploy", TaskConfigBuilder::new("Deploy").after("test").build())
        .with_task("test", TaskConfigBuilder::new("Test").after("build").build())
        .with_task(
            "build",
            TaskConfigBuilder::new("Build")
                .priority(Priority::Critical)
                .deadline("2026-10-16T18:00:00Z")
                .build(),
        )
        .build();

    let mut s = TaskScheduler::new();
    for spec in plan.task_specs() {
        s.add_task(spec.clone()).unwrap();
    }
    assert_eq!(s.topological_order(), vec!["build", "test", "deploy"]);
    assert!(s.get_task("build").unwrap().deadline().is_some());
}
