//! Structured report types (§6 "Output channels"): "orphans, dead symbols,
//! and protected symbols (name, kind, file, line, protection tag)." No
//! network I/O, no rendering — a plain data shape a caller (CLI, test
//! harness) formats however it likes.

use janitor_core::types::{Entity, EntityKind};

/// One reported symbol: a dead or protected entity, flattened to the
/// fields §6 names.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub kind: EntityKind,
    pub file: String,
    pub line: u32,
    /// `None` for a dead symbol; `Some(tag)` for a protected one, where
    /// `tag` is one of `pipeline::tag`'s stable strings (§4.8).
    pub protection_tag: Option<String>,
}

impl From<&Entity> for ReportEntry {
    fn from(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            kind: entity.kind,
            file: entity.file_path.clone(),
            line: entity.line_range.start,
            protection_tag: entity.protected_by.clone(),
        }
    }
}

/// Outcome of one `audit` run (§4.12).
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub orphan_files: Vec<String>,
    pub dead_symbols: Vec<ReportEntry>,
    pub protected_symbols: Vec<ReportEntry>,
    /// True when this report was served by the whole-project cache fast
    /// path without reparsing anything (§4.9, S6).
    pub from_cache: bool,
    /// Internal diagnostic, not surfaced as a verdict (§7): count of
    /// reference candidates that matched more than one definition.
    pub ambiguous_resolution_count: usize,
}

impl AuditReport {
    /// §6 exit codes: `0` success, `1` one or more symbols flagged.
    pub fn exit_code(&self) -> i32 {
        if self.dead_symbols.is_empty() {
            0
        } else {
            1
        }
    }
}

/// Outcome of one `clean` run (§4.12).
#[derive(Debug, Clone)]
pub enum CleanOutcome {
    /// §8: "Clean on a project with no dead symbols is a no-op (no backup
    /// directory created)."
    NoDeadSymbols,
    /// `dry_run` computed the kill list and the plan but wrote nothing and
    /// started no mutation session (§6).
    DryRun { planned: Vec<ReportEntry> },
    Committed {
        files_touched: usize,
        entities_removed: usize,
    },
    RolledBack {
        reason: String,
        files_touched: usize,
    },
}

#[derive(Debug, Clone)]
pub struct CleanReport {
    pub audit: AuditReport,
    pub outcome: CleanOutcome,
    pub exit_code: i32,
}
