//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory with a strata.yml file
pub fn create_task_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "strata.yml", content);
    (temp_dir, path)
}

/// Create a strata.yml with an empty subdirectory next to it
pub fn create_task_file_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, path) = create_task_file(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, path, sub_dir)
}

/// Write a file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A task file for a deployment that needs a build artifact
pub const DEPLOY_TASKS: &str = r#"
name: shop
usage: Build and ship the shop
tasks:
  deploy:
    usage: Deploy the app
    inputs:
      - name: region
        default: us-east-1
        argument-index: 0
        enum: [us-east-1, eu-west-1]
      - name: replicas
        type: integer
        default: 2
        minimum: 1
      - name: artifact
    script: echo "deploying ${artifact} to ${region} x${replicas}"
    tasks:
      artifact:
        usage: Build the release artifact
        script: echo app.tar.gz
"#;
