//! # Validation Diagnostics
//!
//! Path-carrying validation issues and the error that aggregates them.
//!
//! ## Path Construction
//!
//! Paths are assembled bottom-up. A leaf schema reports its issue with an
//! empty path; every composite that recursed into a child prefixes the
//! child's issues with its own segment before returning them:
//!
//! - `.name` for object/map keys that look like identifiers,
//! - `["weird key"]` (JSON string quoting) for every other key,
//! - `[3]` for array positions.
//!
//! The root label (default `root`) is only attached when the caller asks
//! for rendered issues, producing paths such as
//! `root.obj["weird key"].array[3]`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Placeholder substituted with the issue path when rendering a message.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Root label used when the caller does not supply one.
pub const DEFAULT_ROOT: &str = "root";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern compiles"));

/// Format an object/map key as a path segment.
pub fn format_key_path(key: &str) -> String {
    if IDENTIFIER.is_match(key) {
        return format!(".{key}");
    }
    match serde_json::to_string(key) {
        Ok(quoted) => format!("[{quoted}]"),
        Err(_) => format!("[{key:?}]"),
    }
}

/// Format an array position as a path segment.
pub fn format_index_path(index: usize) -> String {
    format!("[{index}]")
}

/// A single validation failure.
///
/// The message is a template containing a `{path}` placeholder; the path is
/// relative to the schema that produced the issue, or rooted once returned
/// from [`ValidationError::issues`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    message: String,
    path: String,
}

impl ValidationIssue {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Path to the offending value, e.g. `root.dictionary["other-key"].array[44]`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The unrendered message template.
    pub fn template(&self) -> &str {
        &self.message
    }

    /// Human-readable message with the path substituted in.
    pub fn message(&self) -> String {
        self.message.replace(PATH_PLACEHOLDER, &self.path)
    }

    fn prefixed(&self, prefix: &str) -> Self {
        Self {
            message: self.message.clone(),
            path: format!("{prefix}{}", self.path),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// A validation failure: an ordered, non-empty list of issues.
///
/// Created fresh by every top-level `validate`/`map` call. Holds no
/// reference back to the schema that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// An error holding one issue at the current (empty) path.
    pub(crate) fn single(message: impl Into<String>) -> Self {
        let mut e = Self::new();
        e.add_issue("", message);
        e
    }

    pub(crate) fn add_issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    pub(crate) fn add_issues(&mut self, other: ValidationError) {
        self.issues.extend(other.issues);
    }

    /// Append `other`'s issues with `prefix` prepended to each path.
    pub(crate) fn add_issues_with_prefix(&mut self, other: &ValidationError, prefix: &str) {
        self.issues
            .extend(other.issues.iter().map(|issue| issue.prefixed(prefix)));
    }

    /// `Ok(())` when no issues were collected, otherwise `Err(self)`.
    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Returns the issues with `root_name` prepended to every path.
    ///
    /// An empty `root_name` falls back to `"root"`.
    pub fn issues(&self, root_name: &str) -> Vec<ValidationIssue> {
        let root = if root_name.is_empty() {
            DEFAULT_ROOT
        } else {
            root_name
        };
        self.issues.iter().map(|issue| issue.prefixed(root)).collect()
    }

    /// Issues with paths relative to the schema that was validated.
    pub fn raw_issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Returns the number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true if there are no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} issue(s)", self.issues.len())?;
        for issue in self.issues(DEFAULT_ROOT) {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
