//! Integration tests for task file parsing

mod common;

use common::{create_task_file_in_subdir, write_file, DEPLOY_TASKS};
use strata::config::{
    build_registry, find_config_file_from, parse_config, parse_config_file, validate_config,
};
use strata::error::ConfigError;
use strata::task::{TaskBody, TaskName, Value};
use tempfile::TempDir;

#[test]
fn test_parse_complete_task_file() {
    let config = parse_config(DEPLOY_TASKS, None).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.name, Some("shop".to_string()));
    let deploy = &config.tasks["deploy"];
    assert_eq!(deploy.inputs.len(), 3);
    assert_eq!(deploy.inputs[0].argument_index, Some(0));
    assert!(deploy.inputs[0].extra.contains_key("enum"));
    assert!(deploy.tasks.contains_key("artifact"));
}

#[test]
fn test_registry_from_task_file() {
    let config = parse_config(DEPLOY_TASKS, None).unwrap();
    let registry = build_registry(&config).unwrap();

    assert_eq!(registry.len(), 2);
    let deploy = registry.find(&TaskName::parse("deploy").unwrap()).unwrap();
    let replicas = deploy.input("replicas").unwrap();
    assert_eq!(replicas.type_name(), "integer");
    assert_eq!(replicas.default, Some(Value::Int(2)));
    assert!(deploy.input("artifact").unwrap().required());

    let artifact = registry
        .find(&TaskName::parse("deploy.artifact").unwrap())
        .unwrap();
    assert!(matches!(artifact.body, TaskBody::Script(ref s) if s == "echo app.tar.gz"));
}

#[test]
fn test_script_lines_are_joined() {
    let yaml = r#"
tasks:
  build:
    script:
      - cargo build
      - cargo test
"#;
    let config = parse_config(yaml, None).unwrap();
    assert_eq!(
        config.tasks["build"].script.as_deref(),
        Some("cargo build\ncargo test")
    );
}

#[test]
fn test_parse_file_with_include() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "release.yml",
        "usage: Cut a release\nscript: echo released\n",
    );
    let path = write_file(
        dir.path(),
        "strata.yml",
        "tasks:\n  release:\n    include: release.yml\n",
    );

    let config = parse_config_file(&path).unwrap();
    assert_eq!(
        config.tasks["release"].usage.as_deref(),
        Some("Cut a release")
    );
}

#[test]
fn test_discovery_from_subdirectory() {
    let (_dir, path, sub_dir) = create_task_file_in_subdir(DEPLOY_TASKS);
    let found = find_config_file_from(sub_dir).unwrap();
    assert_eq!(found, path);
}

#[test]
fn test_validation_rejects_unknown_type() {
    let yaml = r#"
tasks:
  scale:
    inputs:
      - name: replicas
        type: float
"#;
    let config = parse_config(yaml, None).unwrap();
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInputType { ref type_name, .. } if type_name == "float"));
}

#[test]
fn test_validation_rejects_duplicate_argument_index() {
    let yaml = r#"
tasks:
  copy:
    inputs:
      - name: from
        argument-index: 0
      - name: to
        argument-index: 0
"#;
    let config = parse_config(yaml, None).unwrap();
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::DuplicateArgumentIndex { index: 0, .. })
    ));
}

#[test]
fn test_validation_rejects_uncoercible_default() {
    let yaml = r#"
tasks:
  scale:
    inputs:
      - name: replicas
        type: integer
        default: lots
"#;
    let config = parse_config(yaml, None).unwrap();
    assert!(validate_config(&config).is_err());
}
