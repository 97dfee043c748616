//! Engine configuration: the inputs enumerated in §6 "External Interfaces".

use serde::{Deserialize, Serialize};

/// The language selector input (§6): which family of files this run
/// considers in scope. A single run never mixes Python and JS/TS entity
/// extraction, though both may appear on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageSelector {
    Python,
    JavaScriptTypeScript,
}

/// Shield 2.5 ("Library mode") treats any non-underscore-prefixed name as
/// referenced by unknown external callers. `Application` is the default:
/// every symbol must earn its keep through an actual reference or shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PipelineMode {
    #[default]
    Application,
    Library,
}

/// Top-level engine configuration, covering every flag in §6.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JanitorConfig {
    pub language: Option<LanguageSelector>,
    pub mode: PipelineMode,
    /// Shield 5 (§4.8), opt-in because it's O(project size) per symbol.
    pub grep_shield: bool,
    /// Whether vendored/build directories (`node_modules`, `venv`, ...) are
    /// included in the scan rather than excluded wholesale (§4.5).
    pub include_vendored: bool,
    /// Overrides autodetection in the test sandbox (§4.11).
    pub custom_test_command: Option<Vec<String>>,
    /// When set, `clean` computes and reports the kill list and the planned
    /// mutation but performs no filesystem writes and starts no mutation
    /// session.
    pub dry_run: bool,
    /// Wall-clock timeout for the test sandbox, in seconds. Defaults to
    /// [`crate::constants::DEFAULT_TEST_TIMEOUT_SECS`].
    pub test_timeout_secs: Option<u64>,
    /// Directory holding premium rule packs, if any (§4.3, §6).
    pub premium_rules_dir: Option<String>,
}

impl JanitorConfig {
    pub fn effective_test_timeout_secs(&self) -> u64 {
        self.test_timeout_secs
            .unwrap_or(crate::constants::DEFAULT_TEST_TIMEOUT_SECS)
    }

    pub fn is_library_mode(&self) -> bool {
        matches!(self.mode, PipelineMode::Library)
    }
}
