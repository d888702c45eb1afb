//! Execution context passed alongside a batch

use std::path::{Path, PathBuf};

/// Default root directory of a context
pub const DEFAULT_ROOT: &str = "cache";

/// Where a batch currently is inside a (possibly nested) pipeline
///
/// The context is immutable: [`ExecutionContext::push`] returns a child
/// context, the parent stays valid for sibling steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    root: PathBuf,
    parents: Vec<String>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl ExecutionContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parents: Vec::new(),
        }
    }

    /// Child context with `step_name` appended
    pub fn push(&self, step_name: impl Into<String>) -> Self {
        let mut parents = self.parents.clone();
        parents.push(step_name.into());
        Self {
            root: self.root.clone(),
            parents,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the steps traversed so far, outermost first
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Step names joined by `/`, prefixed with the root when `absolute`
    pub fn get_path(&self, absolute: bool) -> String {
        let relative = self.parents.join("/");
        if !absolute {
            return relative;
        }
        self.root.join(relative).to_string_lossy().into_owned()
    }
}
