//! Dead-Symbol Pipeline (C8, §4.8). Runs every extracted entity through an
//! ordered table of shields; the first shield that matches claims the
//! entity by writing a tag into `protected_by`, and no further shield is
//! consulted for it. What's left unprotected at the end is dead. Grounded
//! on `drift-analysis/src/enforcement/`'s ordered rule/shield evaluation
//! over a candidate set — same "first match wins, tag the reason" shape,
//! retargeted from lint findings to liveness shields.

mod grep;

use std::path::Path;
use std::sync::Arc;

use janitor_core::config::PipelineMode;
use janitor_core::types::collections::FxHashMap;
use janitor_core::types::Entity;

use crate::config_scan::ConfigReference;
use crate::orphans::is_immortal_directory;
use crate::parser::Language;
use crate::refs::ReferenceTracker;
use crate::wisdom::{ImmortalityReason, WisdomRegistry};

pub use grep::build_grep_corpus;

/// Stable string tags written into `Entity.protected_by`. A string survives
/// cache/report schema drift across pipeline versions better than a
/// numbered enum would, since cached entity rows are read back from disk
/// across runs of possibly different pipeline revisions.
pub mod tag {
    pub const DIRECTORY: &str = "DirectoryShield";
    pub const REFERENCED: &str = "ReferencedShield";
    pub const LIBRARY_MODE: &str = "LibraryModeShield";
    pub const PACKAGE_EXPORT: &str = "PackageExportShield";
    pub const CONFIG_REFERENCE: &str = "ConfigReferenceShield";
    pub const METAPROGRAMMING: &str = "MetaprogrammingFileShield";
    pub const ENTRY_POINT: &str = "EntryPointShield";
    pub const GREP: &str = "GrepShield";
}

/// File-level markers that signal dynamic symbol access the static pipeline
/// can't see through (§4.8 shield 2.8). A file containing any of these
/// gets every one of its entities spared, since the analysis can't tell
/// which of them the dynamic access actually reaches.
const PYTHON_METAPROGRAMMING_MARKERS: &[&str] =
    &["getattr(", "setattr(", "globals()[", "__getattr__", "importlib.import_module"];
const JS_METAPROGRAMMING_MARKERS: &[&str] = &["Reflect.get(", "Reflect.set(", "new Proxy("];

/// Everything the pipeline needs besides the entity list itself, borrowed
/// for the duration of one `run` call.
pub struct PipelineInput<'a> {
    pub wisdom: &'a WisdomRegistry,
    pub config_references: &'a [ConfigReference],
    pub tracker: &'a ReferenceTracker,
    /// Raw (not lossily-decoded) file bytes, keyed by the same normalized
    /// path entities carry in `file_path`. Sliced, never decoded whole, so
    /// that wisdom's source-text argument never desyncs from an entity's
    /// original byte offsets (§7 EncodingWarning).
    pub file_bytes: &'a FxHashMap<String, Arc<[u8]>>,
    pub mode: PipelineMode,
    /// Corpus for the opt-in grep shield, pre-built by [`build_grep_corpus`].
    /// `None` when the shield is disabled.
    pub grep_corpus: Option<&'a str>,
}

/// Outcome of one pipeline run: entities partitioned into dead and
/// protected. `protected` entities already carry their `protected_by` tag;
/// `dead` entities are exactly those `protected_by` stayed `None` for.
pub struct PipelineOutcome {
    pub dead: Vec<Entity>,
    pub protected: Vec<Entity>,
}

#[derive(Default)]
pub struct DeadSymbolPipeline;

impl DeadSymbolPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every entity against the shield table in order, mutating
    /// `protected_by` in place, then partition into dead/protected.
    pub fn run(&self, mut entities: Vec<Entity>, input: &PipelineInput<'_>) -> PipelineOutcome {
        for entity in entities.iter_mut() {
            self.evaluate(entity, input);
        }

        let (protected, dead) = entities.into_iter().partition(|e| e.is_protected());
        PipelineOutcome { dead, protected }
    }

    fn evaluate(&self, entity: &mut Entity, input: &PipelineInput<'_>) {
        let path = Path::new(&entity.file_path);
        let language = Language::from_path(path).unwrap_or(Language::Python);
        let symbol_id = entity.symbol_id();

        // Shield 0: directory.
        if is_immortal_directory(path) {
            entity.protected_by = Some(tag::DIRECTORY.to_string());
            return;
        }

        // Shields 1a/1b: referenced, cross-file or intra-file alike. Any
        // non-synthetic incoming reference is enough — the constructor and
        // inheritance shields already handle the synthetic edges that must
        // NOT count here, via `ReferenceKind::is_synthetic`.
        if input.tracker.graph().live_in_degree(&symbol_id) > 0 {
            entity.protected_by = Some(tag::REFERENCED.to_string());
            return;
        }

        // Shield 2: wisdom registry. Source text is sliced from raw bytes
        // first, then lossily decoded — never the reverse.
        if let Some(bytes) = input.file_bytes.get(&entity.file_path) {
            let end = entity.byte_range.end.min(bytes.len());
            let start = entity.byte_range.start.min(end);
            let source_text = String::from_utf8_lossy(&bytes[start..end]);
            if let Some(reason) = input.wisdom.is_immortal(&entity.name, &source_text, language) {
                entity.protected_by = Some(format_wisdom_tag(&reason));
                return;
            }
        }

        // Shield 2.5: library mode. In library mode every top-level,
        // non-underscore-prefixed declaration is the crate's own public
        // API surface, which by definition has no in-repo caller.
        if input.mode == PipelineMode::Library
            && entity.parent_class.is_none()
            && !entity.name.starts_with('_')
        {
            entity.protected_by = Some(tag::LIBRARY_MODE.to_string());
            return;
        }

        // Shield 2.6: package export (`__all__` / `module.exports` /
        // `export { ... }` re-export lists), already indexed by the
        // tracker at construction time.
        if input.tracker.is_package_export(&symbol_id) {
            entity.protected_by = Some(tag::PACKAGE_EXPORT.to_string());
            return;
        }

        // Shield 2.7: referenced by name from an infra config file (CI
        // workflow step, DAG task id, settings module path, ...).
        if input
            .config_references
            .iter()
            .any(|cfg| cfg.name == entity.name)
        {
            entity.protected_by = Some(tag::CONFIG_REFERENCE.to_string());
            return;
        }

        // Shield 2.8: metaprogramming file. A whole-file marker check, safe
        // to do via a single lossy decode since no byte-offset math follows.
        if let Some(bytes) = input.file_bytes.get(&entity.file_path) {
            let whole_file = String::from_utf8_lossy(bytes);
            let markers: &[&str] = if language.is_python() {
                PYTHON_METAPROGRAMMING_MARKERS
            } else {
                JS_METAPROGRAMMING_MARKERS
            };
            if markers.iter().any(|m| whole_file.contains(m)) {
                entity.protected_by = Some(tag::METAPROGRAMMING.to_string());
                return;
            }
        }

        // Shield 3 (constructor/inheritance) is not evaluated here: it is
        // applied at reference-ingestion time as synthetic edges, which
        // shields 1a/1b already consult through `live_in_degree`.

        // Shield 4: entry point. A file recognised as a project entry
        // point (script guard / framework index file) often dispatches its
        // top-level declarations dynamically (CLI subcommands, route
        // tables) in ways the static reference walk can't always see —
        // its top-level declarations are spared.
        if entity.parent_class.is_none() {
            let source_text = input
                .file_bytes
                .get(&entity.file_path)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default();
            if crate::orphans::is_entry_point_file(path, &source_text, language) {
                entity.protected_by = Some(tag::ENTRY_POINT.to_string());
                return;
            }
        }

        // Shields 4.x (enterprise framework heuristics) are not a separate
        // pass: every one of them (Depends/Security/Inject hints, pytest
        // fixtures, ORM lifecycle hooks, Qt slots, DI decorator tokens, ...)
        // is synthesised as an ordinary candidate reference at ingestion
        // time in `refs::ingest`, so it is already covered by shields 1a/1b.

        // Shield 5: grep, opt-in only.
        if let Some(corpus) = input.grep_corpus {
            if corpus.contains(&entity.name) {
                entity.protected_by = Some(tag::GREP.to_string());
            }
        }
    }
}

fn format_wisdom_tag(reason: &ImmortalityReason) -> String {
    format!("{}:{}:{}", ImmortalityReason::TAG, reason.step, reason.detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use janitor_core::types::entity::{ByteRange, EntityKind, LineRange};
    use janitor_core::types::collections::FxHashMap as CoreFxHashMap;
    use std::sync::Arc;

    fn entity(name: &str, file_path: &str, parent_class: Option<&str>) -> Entity {
        Entity {
            name: name.to_string(),
            kind: EntityKind::Function,
            file_path: file_path.to_string(),
            byte_range: ByteRange::new(0, 4),
            line_range: LineRange { start: 1, end: 1 },
            qualified_name: name.to_string(),
            parent_class: parent_class.map(|s| s.to_string()),
            base_classes: vec![],
            decorators: vec![],
            structural_hash: None,
            protected_by: None,
        }
    }

    fn empty_input<'a>(
        wisdom: &'a WisdomRegistry,
        tracker: &'a ReferenceTracker,
        file_bytes: &'a CoreFxHashMap<String, Arc<[u8]>>,
    ) -> PipelineInput<'a> {
        PipelineInput {
            wisdom,
            config_references: &[],
            tracker,
            file_bytes,
            mode: PipelineMode::Application,
            grep_corpus: None,
        }
    }

    #[test]
    fn directory_shield_protects_before_anything_else() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let file_bytes = CoreFxHashMap::default();
        let input = empty_input(&wisdom, &tracker, &file_bytes);
        let mut e = entity("helper", "tests/fixtures/helper.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);

        assert_eq!(e.protected_by.as_deref(), Some(tag::DIRECTORY));
    }

    #[test]
    fn unreferenced_unprotected_entity_stays_dead() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let file_bytes = CoreFxHashMap::default();
        let input = empty_input(&wisdom, &tracker, &file_bytes);
        let mut e = entity("totally_unused", "src/app.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);

        assert!(e.protected_by.is_none());
    }

    #[test]
    fn library_mode_protects_public_top_level_symbol() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let file_bytes = CoreFxHashMap::default();
        let mut input = empty_input(&wisdom, &tracker, &file_bytes);
        input.mode = PipelineMode::Library;
        let mut e = entity("public_api", "src/lib.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);

        assert_eq!(e.protected_by.as_deref(), Some(tag::LIBRARY_MODE));
    }

    #[test]
    fn library_mode_does_not_protect_private_symbol() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let file_bytes = CoreFxHashMap::default();
        let mut input = empty_input(&wisdom, &tracker, &file_bytes);
        input.mode = PipelineMode::Library;
        let mut e = entity("_private_helper", "src/lib.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);

        assert!(e.protected_by.is_none());
    }

    #[test]
    fn config_reference_shield_matches_final_segment() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let file_bytes = CoreFxHashMap::default();
        let configs = vec![ConfigReference {
            name: "nightly_cleanup".to_string(),
            full: "dags.nightly_cleanup".to_string(),
            source_file: "dags/schedule.py".to_string(),
        }];
        let mut input = empty_input(&wisdom, &tracker, &file_bytes);
        input.config_references = &configs;
        let mut e = entity("nightly_cleanup", "dags/tasks.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);

        assert_eq!(e.protected_by.as_deref(), Some(tag::CONFIG_REFERENCE));
    }

    #[test]
    fn metaprogramming_marker_protects_every_entity_in_file() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let mut file_bytes: CoreFxHashMap<String, Arc<[u8]>> = CoreFxHashMap::default();
        file_bytes.insert(
            "src/dynamic.py".to_string(),
            Arc::from(b"value = getattr(obj, name)".as_slice()),
        );
        let input = empty_input(&wisdom, &tracker, &file_bytes);
        let mut e = entity("unused_helper", "src/dynamic.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);

        assert_eq!(e.protected_by.as_deref(), Some(tag::METAPROGRAMMING));
    }

    #[test]
    fn grep_shield_only_applies_when_opted_in() {
        let wisdom = WisdomRegistry::community_only();
        let tracker = ReferenceTracker::new(vec![]);
        let file_bytes = CoreFxHashMap::default();
        let mut input = empty_input(&wisdom, &tracker, &file_bytes);
        let mut e = entity("mentioned_in_yaml", "src/app.py", None);

        let pipeline = DeadSymbolPipeline::new();
        pipeline.evaluate(&mut e, &input);
        assert!(e.protected_by.is_none());

        input.grep_corpus = Some("steps:\n  - run: mentioned_in_yaml\n");
        pipeline.evaluate(&mut e, &input);
        assert_eq!(e.protected_by.as_deref(), Some(tag::GREP));
    }
}
