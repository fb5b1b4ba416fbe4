//! Walk options.

use serde::{Deserialize, Serialize};

use crate::WalkError;

/// Options recognized by [`walk`](crate::walk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkOptions {
    /// Run each class instance's unmount hook once its subtree has been
    /// visited. Errors from the hook are logged and never fail the walk.
    /// Default: false
    #[serde(alias = "runUnmountHookAfterVisit", alias = "componentWillUnmount")]
    pub run_unmount_hook_after_visit: bool,
}

impl WalkOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the post-visit unmount hook.
    pub fn run_unmount_hook_after_visit(mut self, yes: bool) -> Self {
        self.run_unmount_hook_after_visit = yes;
        self
    }

    /// Parses options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, WalkError> {
        serde_json::from_str(json)
            .map_err(|e| WalkError::config(format!("Invalid walk options: {}", e)))
    }
}
