//! `${path}` references in scripts
//!
//! A reference names a flattened input path such as `${db.host}` or, when no
//! input has that path, an environment variable. References to neither are
//! left in place for the shell.

use crate::error::{InterpolationError, InterpolationResult};
use crate::task::FlatInputs;
use regex::Regex;
use std::env;

const REFERENCE_PATTERN: &str = r"\$\{([^}]+)\}";

/// Deepest chain of values expanding into further references
const MAX_DEPTH: usize = 16;

/// Expand the references in `script`
///
/// Values may contain references themselves. A value that refers back to a
/// reference being expanded keeps that reference literally.
pub fn interpolate(script: &str, inputs: &FlatInputs) -> InterpolationResult<String> {
    let re = Regex::new(REFERENCE_PATTERN)
        .map_err(|e| InterpolationError::InvalidSyntax(e.to_string()))?;
    expand(&re, script, inputs, &mut Vec::new())
}

fn expand(
    re: &Regex,
    text: &str,
    inputs: &FlatInputs,
    active: &mut Vec<String>,
) -> InterpolationResult<String> {
    if active.len() > MAX_DEPTH {
        return Err(InterpolationError::RecursiveInterpolation);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        let path = path.as_str();
        let value = if active.iter().any(|p| p == path) {
            None
        } else {
            reference_value(path, inputs)
        };

        match value {
            Some(value) => {
                active.push(path.to_string());
                let expanded = expand(re, &value, inputs, active);
                active.pop();
                out.push_str(&expanded?);
            }
            None => out.push_str(whole.as_str()),
        }
    }

    out.push_str(&text[last..]);
    Ok(out)
}

fn reference_value(path: &str, inputs: &FlatInputs) -> Option<String> {
    inputs
        .get(path)
        .map(ToString::to_string)
        .or_else(|| env::var(path).ok())
}
