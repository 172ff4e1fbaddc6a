//! Integration tests for resolving inputs and running tasks

mod common;

use common::DEPLOY_TASKS;
use std::cell::RefCell;
use std::collections::HashMap;
use strata::config::{build_registry, parse_config, MapConfigStore, YamlConfigStore};
use strata::error::{ExecutionError, ExecutionResult};
use strata::runner::{Executor, RunContext, ShellExecutor, TaskInvoker};
use strata::task::{ArgumentSet, FlatInputs, TaskDefinition, TaskName, TaskRegistry, Value};
use strata::StrataError;
use tempfile::TempDir;

/// Returns canned outputs and records every run
#[derive(Default)]
struct RecordingExecutor {
    outputs: HashMap<String, String>,
    runs: RefCell<Vec<(String, FlatInputs)>>,
}

impl RecordingExecutor {
    fn with_output(mut self, task: &str, output: &str) -> Self {
        self.outputs.insert(task.to_string(), output.to_string());
        self
    }

    fn runs_of(&self, task: &str) -> Vec<FlatInputs> {
        self.runs
            .borrow()
            .iter()
            .filter(|(t, _)| t == task)
            .map(|(_, inputs)| inputs.clone())
            .collect()
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, task: &TaskDefinition, inputs: &FlatInputs) -> ExecutionResult<String> {
        let name = task.name.to_string();
        self.runs.borrow_mut().push((name.clone(), inputs.clone()));
        self.outputs
            .get(&name)
            .cloned()
            .ok_or(ExecutionError::CommandFailed(Some(2)))
    }
}

fn registry(yaml: &str) -> TaskRegistry {
    build_registry(&parse_config(yaml, None).unwrap()).unwrap()
}

fn name(s: &str) -> TaskName {
    TaskName::parse(s).unwrap()
}

fn deploy_executor() -> RecordingExecutor {
    RecordingExecutor::default()
        .with_output("deploy", "deployed")
        .with_output("deploy.artifact", "app.tar.gz")
}

#[test]
fn test_dependency_runs_once_and_feeds_input() {
    let registry = registry(DEPLOY_TASKS);
    let config = MapConfigStore::new();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let output = invoker
        .run_task(&name("deploy"), &[], &ArgumentSet::new(), None)
        .unwrap();

    assert_eq!(output, "deployed");
    assert_eq!(executor.runs_of("deploy.artifact").len(), 1);

    let runs = executor.runs_of("deploy");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].get("artifact"), Some(&Value::from("app.tar.gz")));
    assert_eq!(runs[0].get("region"), Some(&Value::from("us-east-1")));
    assert_eq!(runs[0].get("replicas"), Some(&Value::Int(2)));
}

#[test]
fn test_outputs_are_cached_for_the_run() {
    let registry = registry(DEPLOY_TASKS);
    let config = MapConfigStore::new();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let mut ctx = RunContext::new();
    for _ in 0..2 {
        invoker
            .invoke(&mut ctx, &name("deploy"), &[], &ArgumentSet::new(), None)
            .unwrap();
    }

    assert_eq!(executor.runs_of("deploy").len(), 2);
    assert_eq!(executor.runs_of("deploy.artifact").len(), 1);
    assert_eq!(ctx.cache.get(&["artifact".to_string()]), Some("app.tar.gz"));
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_fresh_run_does_not_reuse_outputs() {
    let registry = registry(DEPLOY_TASKS);
    let config = MapConfigStore::new();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    for _ in 0..2 {
        invoker
            .run_task(&name("deploy"), &[], &ArgumentSet::new(), None)
            .unwrap();
    }

    assert_eq!(executor.runs_of("deploy.artifact").len(), 2);
}

#[test]
fn test_positional_beats_config_and_config_beats_default() {
    let registry = registry(DEPLOY_TASKS);
    let config = YamlConfigStore::from_yaml_str("region: eu-west-1\n").unwrap();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    invoker
        .run_task(&name("deploy"), &["us-east-1".to_string()], &ArgumentSet::new(), None)
        .unwrap();
    invoker
        .run_task(&name("deploy"), &[], &ArgumentSet::new(), None)
        .unwrap();

    let runs = executor.runs_of("deploy");
    assert_eq!(runs[0].get("region"), Some(&Value::from("us-east-1")));
    assert_eq!(runs[1].get("region"), Some(&Value::from("eu-west-1")));
}

#[test]
fn test_caller_scope_beats_task_scope() {
    let registry = registry(DEPLOY_TASKS);
    let config = YamlConfigStore::from_yaml_str(
        r#"
deploy:
  region: eu-west-1
release:
  region: us-east-1
"#,
    )
    .unwrap();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    invoker
        .run_task(&name("deploy"), &[], &ArgumentSet::new(), Some(&name("release")))
        .unwrap();
    invoker
        .run_task(&name("deploy"), &[], &ArgumentSet::new(), None)
        .unwrap();

    let runs = executor.runs_of("deploy");
    assert_eq!(runs[0].get("region"), Some(&Value::from("us-east-1")));
    assert_eq!(runs[1].get("region"), Some(&Value::from("eu-west-1")));
}

#[test]
fn test_config_value_that_is_not_a_number() {
    let registry = registry(DEPLOY_TASKS);
    let config = YamlConfigStore::new()
        .with_override("replicas=notanumber")
        .unwrap();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let err = invoker
        .run_task(&name("deploy"), &[], &ArgumentSet::new(), None)
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        StrataError::TypeCoercion { ref input, ref raw, ref target }
            if input == "replicas" && raw == "notanumber" && target == "integer"
    ));
    assert!(executor.runs_of("deploy").is_empty());
}

#[test]
fn test_schema_rejects_value_outside_enum() {
    let registry = registry(DEPLOY_TASKS);
    let config = MapConfigStore::new();
    let executor = deploy_executor();
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let explicit = ArgumentSet::new().with("region", "mars").with("replicas", 0i64);
    let err = invoker
        .run_task(&name("deploy"), &[], &explicit, None)
        .unwrap_err();

    match err.root_cause() {
        StrataError::SchemaValidation(fields) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert!(names.contains(&"region"));
            assert!(names.contains(&"replicas"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(executor.runs_of("deploy").is_empty());
}

#[test]
fn test_child_inputs_override_inherited_ones() {
    let registry = registry(
        r#"
tasks:
  db:
    inputs:
      - name: host
        default: parent-host
      - name: port
        type: integer
        default: 5432
    tasks:
      migrate:
        inputs:
          - name: host
            default: child-host
"#,
    );
    let config = MapConfigStore::new();
    let executor = RecordingExecutor::default().with_output("db.migrate", "migrated");
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    invoker
        .run_task(&name("db.migrate"), &[], &ArgumentSet::new(), None)
        .unwrap();

    let runs = executor.runs_of("db.migrate");
    assert_eq!(runs[0].get("host"), Some(&Value::from("child-host")));
    assert_eq!(runs[0].get("port"), Some(&Value::Int(5432)));
}

#[test]
fn test_failing_dependency_reports_the_path() {
    let registry = registry(DEPLOY_TASKS);
    let config = MapConfigStore::new();
    let executor = RecordingExecutor::default().with_output("deploy", "deployed");
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let err = invoker
        .run_task(&name("deploy"), &[], &ArgumentSet::new(), None)
        .unwrap_err();

    assert_eq!(err.task_path(), vec!["deploy", "deploy.artifact"]);
    assert!(matches!(
        err.root_cause(),
        StrataError::Execution(ExecutionError::CommandFailed(Some(2)))
    ));
    assert!(err.to_string().contains("Input 'artifact' depends on task 'deploy.artifact'"));
}

#[test]
fn test_missing_input_without_provider() {
    let registry = registry(
        r#"
tasks:
  greet:
    inputs:
      - name: who
"#,
    );
    let config = MapConfigStore::new();
    let executor = RecordingExecutor::default().with_output("greet", "hi");
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let err = invoker
        .run_task(&name("greet"), &[], &ArgumentSet::new(), None)
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        StrataError::MissingRequiredInput { ref task, ref input } if task == "greet" && input == "who"
    ));
}

#[test]
fn test_shell_executor_end_to_end() {
    let dir = TempDir::new().unwrap();
    let registry = registry(DEPLOY_TASKS);
    let config = MapConfigStore::new();
    let executor = ShellExecutor::new().with_working_dir(dir.path().to_path_buf());
    let invoker = TaskInvoker::new(&registry, &config, &executor);

    let output = invoker
        .run_task(&name("deploy"), &["eu-west-1".to_string()], &ArgumentSet::new(), None)
        .unwrap();

    assert_eq!(output, "deploying app.tar.gz to eu-west-1 x2");
}
