//! Hierarchical task names
//!
//! Tasks are addressed by dot-separated names. `deploy.artifact` is nested
//! under `deploy`, which is a top-level task and therefore has no parent.

use crate::error::{ConfigError, ConfigResult};
use std::fmt;

/// Fully-qualified, dot-segmented task name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskName {
    segments: Vec<String>,
}

impl TaskName {
    /// Parse a dotted name, rejecting empty segments
    pub fn parse(name: &str) -> ConfigResult<Self> {
        let segments: Vec<String> = name.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidTaskName(name.to_string()));
        }
        Ok(TaskName { segments })
    }

    /// Build a name from already-validated segments
    pub fn from_segments<I, S>(segments: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty() || s.contains('.')) {
            return Err(ConfigError::InvalidTaskName(segments.join(".")));
        }
        Ok(TaskName { segments })
    }

    /// The enclosing task name, or `None` for a top-level task
    pub fn parent(&self) -> Option<TaskName> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(TaskName {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The last segment
    pub fn short_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Append a (possibly dotted) suffix
    pub fn join(&self, suffix: &str) -> ConfigResult<TaskName> {
        let suffix = TaskName::parse(suffix)?;
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments);
        Ok(TaskName { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// This name and all of its ancestors, innermost first
    pub fn ancestry(&self) -> impl Iterator<Item = TaskName> {
        std::iter::successors(Some(self.clone()), TaskName::parent)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl std::str::FromStr for TaskName {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        TaskName::parse(s)
    }
}
