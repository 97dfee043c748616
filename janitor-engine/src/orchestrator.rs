//! The Orchestrator (C12, §4.12): drives one `audit` or `clean` run end to
//! end. Grounded on `drift-analysis`'s `scanner.rs` (discovery → rayon
//! per-file pass → serial merge) and `engine/pipeline.rs` (ordered,
//! named analysis phases emitting progress events as they go).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use janitor_core::config::{JanitorConfig, LanguageSelector};
use janitor_core::errors::AnalysisError;
use janitor_core::events::types::{
    AuditCompleteEvent, AuditStartedEvent, EngineErrorEvent, MutationOutcome,
    MutationSessionEndedEvent, MutationSessionStartedEvent, PhaseCompleteEvent,
    PhaseProgressEvent, PhaseStartedEvent, TestRunCompleteEvent, TestRunStartedEvent,
};
use janitor_core::events::{EventDispatcher, JanitorEventHandler};
use janitor_core::session::SessionGuard;
use janitor_core::traits::cache_store::ProjectResultRow;
use janitor_core::types::collections::FxHashMap;
use janitor_core::types::{Entity, FileGraph};

use janitor_analysis::cache::{check_freshness, hash_content, AnalysisCache, FileFingerprint, FreshnessCheck};
use janitor_analysis::config_scan::ConfigReferenceScanner;
use janitor_analysis::depgraph::{normalize, walk_source_files, DependencyGraphBuilder, KnownFiles};
use janitor_analysis::orphans::detect_orphans;
use janitor_analysis::parser::{Language, ParserAdapter};
use janitor_analysis::pipeline::{build_grep_corpus, DeadSymbolPipeline, PipelineInput};
use janitor_analysis::refs::ReferenceTracker;
use janitor_analysis::wisdom::WisdomRegistry;

use janitor_mutate::{evaluate, FileMutationPlan, MutationVerdict, OrphanFilePlan, SafeMutator, TestSandbox};
use janitor_storage::SqliteCacheStore;

use crate::error::EngineError;
use crate::file_unit::{self, FileUnit};
use crate::project_hash;
use crate::report::{AuditReport, CleanOutcome, CleanReport, ReportEntry};

pub struct Orchestrator {
    project_root: PathBuf,
    config: JanitorConfig,
    cache: AnalysisCache,
    parser: ParserAdapter,
    wisdom: WisdomRegistry,
    events: EventDispatcher,
}

impl Orchestrator {
    pub fn new(project_root: impl Into<PathBuf>, config: JanitorConfig) -> Result<Self, EngineError> {
        let project_root = project_root.into();
        if !project_root.is_dir() {
            return Err(EngineError::Analysis(AnalysisError::InvalidRoot {
                path: project_root.display().to_string(),
            }));
        }

        let store = SqliteCacheStore::open_for_project(&project_root)?;
        let cache = AnalysisCache::new(store);
        let wisdom = match &config.premium_rules_dir {
            Some(dir) => WisdomRegistry::with_premium_dir(Path::new(dir)),
            None => WisdomRegistry::community_only(),
        };

        Ok(Self {
            project_root,
            config,
            cache,
            parser: ParserAdapter::new(),
            wisdom,
            events: EventDispatcher::new(),
        })
    }

    pub fn register_event_handler(&mut self, handler: Arc<dyn JanitorEventHandler>) {
        self.events.register(handler);
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// §6/§9 open question: the language selector is a required input in
    /// principle, but `JanitorConfig::language` is `Option` for ergonomics.
    /// When unset, pick whichever family has more source files on disk —
    /// a project is never a 50/50 split in practice, and this keeps a bare
    /// `JanitorConfig::default()` usable without forcing a choice up front.
    fn resolve_language_selector(&self, by_family: &FxHashMap<&'static str, Vec<PathBuf>>) -> LanguageSelector {
        if let Some(selector) = self.config.language {
            return selector;
        }
        let py = by_family.get("python").map(Vec::len).unwrap_or(0);
        let js = by_family.get("javascript").map(Vec::len).unwrap_or(0)
            + by_family.get("typescript").map(Vec::len).unwrap_or(0);
        if js > py {
            LanguageSelector::JavaScriptTypeScript
        } else {
            LanguageSelector::Python
        }
    }

    fn discover(&self) -> (LanguageSelector, Vec<(PathBuf, Language)>) {
        let mut by_family: FxHashMap<&'static str, Vec<PathBuf>> = FxHashMap::default();
        by_family.insert(
            "python",
            walk_source_files(&self.project_root, Language::Python, self.config.include_vendored),
        );
        by_family.insert(
            "javascript",
            walk_source_files(&self.project_root, Language::JavaScript, self.config.include_vendored),
        );
        by_family.insert(
            "typescript",
            walk_source_files(&self.project_root, Language::TypeScript, self.config.include_vendored),
        );

        let selector = self.resolve_language_selector(&by_family);
        let mut files = Vec::new();
        match selector {
            LanguageSelector::Python => {
                for path in by_family.remove("python").unwrap_or_default() {
                    files.push((path, Language::Python));
                }
            }
            LanguageSelector::JavaScriptTypeScript => {
                for path in by_family.remove("javascript").unwrap_or_default() {
                    files.push((path, Language::JavaScript));
                }
                for path in by_family.remove("typescript").unwrap_or_default() {
                    files.push((path, Language::TypeScript));
                }
            }
        }
        (selector, files)
    }

    /// §4.9/§4.12: cheap per-file content hash, used to compute the
    /// whole-project cache key without the cost of parsing anything —
    /// trusts the cached `content_hash` whenever `mtime`+`size` still
    /// matches, falling back to an actual read+hash otherwise.
    fn content_hash_of(&self, path: &Path, normalized: &str) -> Result<Vec<u8>, EngineError> {
        let fingerprint = FileFingerprint::stat(path).map_err(|source| {
            EngineError::Analysis(AnalysisError::Io {
                path: normalized.to_string(),
                source,
            })
        })?;
        let cached = self.cache.get_file_metadata(normalized)?;
        match check_freshness(&fingerprint, cached.as_ref()) {
            FreshnessCheck::UnchangedTrusted { content_hash } => Ok(content_hash),
            FreshnessCheck::NeedsRehash => {
                let bytes = std::fs::read(path).map_err(|source| {
                    EngineError::Analysis(AnalysisError::Io {
                        path: normalized.to_string(),
                        source,
                    })
                })?;
                Ok(hash_content(&bytes))
            }
        }
    }

    /// Run one full audit (§4.12). Tries the whole-project cache first;
    /// on a miss, runs the three-phase analysis and the shield pipeline,
    /// then writes the whole-project result back.
    pub fn audit(&self) -> Result<AuditReport, EngineError> {
        let (report, _dead_entities) = self.run(false)?;
        Ok(report)
    }

    /// Like [`Self::audit`], but always performs the full three-phase
    /// analysis and returns the real dead [`Entity`] values (with byte
    /// ranges) alongside the report, for [`Self::clean`] to build mutation
    /// plans from. The whole-project cache only stores [`ReportEntry`] JSON
    /// (no byte ranges), so it cannot serve this path — but a successful
    /// run still writes that cache back, so a later plain `audit()` gets
    /// the fast path again.
    fn analyze_for_mutation(&self) -> Result<(AuditReport, Vec<Entity>), EngineError> {
        self.run(true)
    }

    fn run(&self, force_full: bool) -> Result<(AuditReport, Vec<Entity>), EngineError> {
        let run_start = Instant::now();
        self.events.on_audit_started(&AuditStartedEvent {
            root: self.project_root.clone(),
        });

        let (_selector, path_language) = self.discover();
        let known_paths: Vec<String> = path_language
            .iter()
            .map(|(path, _)| normalize(path))
            .collect();
        let known = KnownFiles::new(&self.project_root, known_paths.clone());

        let mut hash_pairs = Vec::with_capacity(path_language.len());
        for (path, _) in &path_language {
            let normalized = normalize(path);
            let hash = self.content_hash_of(path, &normalized)?;
            hash_pairs.push((normalized, hash));
        }
        let project_hash = project_hash::compute(&mut hash_pairs, &self.config);

        if !force_full {
            if let Some(row) = self.cache.get_project_result(&project_hash)? {
                let dead_symbols: Vec<ReportEntry> =
                    serde_json::from_str(&row.dead_symbols_json).unwrap_or_default();
                let orphan_files: Vec<String> =
                    serde_json::from_str(&row.orphans_json).unwrap_or_default();
                let report = AuditReport {
                    orphan_files,
                    dead_symbols,
                    protected_symbols: Vec::new(),
                    from_cache: true,
                    ambiguous_resolution_count: 0,
                };
                self.events.on_audit_complete(&AuditCompleteEvent {
                    orphan_count: report.orphan_files.len(),
                    dead_symbol_count: report.dead_symbols.len(),
                    protected_count: 0,
                    duration_ms: run_start.elapsed().as_millis() as u64,
                    from_cache: true,
                });
                return Ok((report, Vec::new()));
            }
        }

        let (report, dead_entities) = self.run_full_analysis(&known, &path_language, run_start)?;

        let dead_symbols_json = serde_json::to_string(&report.dead_symbols).unwrap_or_default();
        let orphans_json = serde_json::to_string(&report.orphan_files).unwrap_or_default();
        self.cache.put_project_result(&ProjectResultRow {
            project_hash,
            dead_symbols_json,
            orphans_json,
            created_at: now_secs(),
        })?;

        Ok((report, dead_entities))
    }

    fn run_full_analysis(
        &self,
        known: &KnownFiles,
        path_language: &[(PathBuf, Language)],
        run_start: Instant,
    ) -> Result<(AuditReport, Vec<Entity>), EngineError> {
        // Phase 1: per-file parse/extract, fanned out over rayon.
        let phase_start = Instant::now();
        self.events.on_phase_started(&PhaseStartedEvent { phase: "extract" });
        let total = path_language.len();
        let processed = AtomicUsize::new(0);
        let file_units: Vec<FileUnit> = path_language
            .par_iter()
            .map(|(path, language)| {
                let result = file_unit::analyze_file(path, *language, known, &self.cache, &self.parser);
                let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if n % 100 == 0 || n == total {
                    self.events.on_phase_progress(&PhaseProgressEvent {
                        phase: "extract",
                        processed: n,
                        total,
                    });
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.events.on_phase_complete(&PhaseCompleteEvent {
            phase: "extract",
            duration_ms: phase_start.elapsed().as_millis() as u64,
        });

        // Phase 2: file graph + orphans.
        let phase_start = Instant::now();
        self.events.on_phase_started(&PhaseStartedEvent { phase: "graph" });
        let mut graph = FileGraph::new();
        for unit in &file_units {
            graph.ensure_node(&unit.normalized);
        }
        for unit in &file_units {
            for target in &unit.dependency_targets {
                graph.add_edge(&unit.normalized, target);
            }
        }
        let decoded_texts: Vec<String> = file_units
            .iter()
            .map(|u| String::from_utf8_lossy(&u.source_text).into_owned())
            .collect();
        let orphan_input = file_units
            .iter()
            .zip(decoded_texts.iter())
            .map(|(unit, text)| (unit.path.as_path(), text.as_str(), unit.language));
        let orphan_files = detect_orphans(orphan_input, &graph);
        self.events.on_phase_complete(&PhaseCompleteEvent {
            phase: "graph",
            duration_ms: phase_start.elapsed().as_millis() as u64,
        });

        // Phase 3: reference resolution. The type registry is one shared,
        // sequentially-mutated table keyed by `(file, scope, name)`, so
        // ingestion runs serially rather than over `rayon` here.
        let phase_start = Instant::now();
        self.events.on_phase_started(&PhaseStartedEvent { phase: "resolve" });
        let all_entities: Vec<Entity> = file_units.iter().flat_map(|u| u.entities.clone()).collect();
        let mut tracker = ReferenceTracker::new(all_entities.clone());
        let dep_builder = DependencyGraphBuilder::new(known);
        for unit in &file_units {
            let candidates = {
                let type_registry = tracker.type_registry_mut();
                file_unit::candidate_references(unit, &self.cache, &self.parser, &dep_builder, type_registry)?
            };
            for candidate in candidates {
                tracker.add_reference(candidate);
            }
        }
        let ambiguous_resolution_count = tracker.ambiguous_resolution_count();
        self.events.on_phase_complete(&PhaseCompleteEvent {
            phase: "resolve",
            duration_ms: phase_start.elapsed().as_millis() as u64,
        });

        // Dead-symbol pipeline.
        let phase_start = Instant::now();
        self.events.on_phase_started(&PhaseStartedEvent { phase: "shield" });
        let config_references = ConfigReferenceScanner::new().scan_project(&self.project_root);
        let file_bytes: FxHashMap<String, Arc<[u8]>> = file_units
            .iter()
            .map(|u| (u.normalized.clone(), u.source_text.clone()))
            .collect();
        let grep_corpus = if self.config.grep_shield {
            let representative = path_language
                .first()
                .map(|(_, lang)| *lang)
                .unwrap_or(Language::Python);
            Some(build_grep_corpus(&self.project_root, representative, self.config.include_vendored))
        } else {
            None
        };
        let pipeline_input = PipelineInput {
            wisdom: &self.wisdom,
            config_references: &config_references,
            tracker: &tracker,
            file_bytes: &file_bytes,
            mode: self.config.mode,
            grep_corpus: grep_corpus.as_deref(),
        };
        let outcome = DeadSymbolPipeline::new().run(all_entities, &pipeline_input);
        self.events.on_phase_complete(&PhaseCompleteEvent {
            phase: "shield",
            duration_ms: phase_start.elapsed().as_millis() as u64,
        });

        let dead_symbols: Vec<ReportEntry> = outcome.dead.iter().map(ReportEntry::from).collect();
        let protected_symbols: Vec<ReportEntry> = outcome.protected.iter().map(ReportEntry::from).collect();

        self.events.on_audit_complete(&AuditCompleteEvent {
            orphan_count: orphan_files.len(),
            dead_symbol_count: dead_symbols.len(),
            protected_count: protected_symbols.len(),
            duration_ms: run_start.elapsed().as_millis() as u64,
            from_cache: false,
        });

        let report = AuditReport {
            orphan_files,
            dead_symbols,
            protected_symbols,
            from_cache: false,
            ambiguous_resolution_count,
        };

        Ok((report, outcome.dead))
    }

    /// Run `audit`, then mutate, verify, and commit or roll back (§4.12).
    /// A dry run stops after computing the kill list; no session starts,
    /// nothing is written.
    pub fn clean(&self) -> Result<CleanReport, EngineError> {
        let (audit_report, dead_entities) = self.analyze_for_mutation()?;

        if audit_report.dead_symbols.is_empty() && audit_report.orphan_files.is_empty() {
            return Ok(CleanReport {
                exit_code: 0,
                outcome: CleanOutcome::NoDeadSymbols,
                audit: audit_report,
            });
        }

        if self.config.dry_run {
            let planned = audit_report.dead_symbols.clone();
            let exit_code = if planned.is_empty() { 0 } else { 1 };
            return Ok(CleanReport {
                exit_code,
                outcome: CleanOutcome::DryRun { planned },
                audit: audit_report,
            });
        }

        let session_id = format!("{}-{}", now_nanos(), std::process::id());
        let guard = SessionGuard::acquire(&self.project_root, session_id.clone())?;

        let symbol_plans = self.build_symbol_plans(&dead_entities)?;
        let orphan_plans = self.build_orphan_plans(&audit_report)?;
        let file_count = symbol_plans.len() + orphan_plans.len();
        self.events.on_mutation_session_started(&MutationSessionStartedEvent {
            session_id: session_id.clone(),
            file_count,
        });

        let mut mutator = SafeMutator::new(&self.project_root, &guard.session_dir())?;

        let sandbox = TestSandbox::autodetect(
            &self.project_root,
            self.config.custom_test_command.as_deref(),
            self.config.effective_test_timeout_secs(),
        )?;

        self.events.on_test_run_started(&TestRunStartedEvent { label: "baseline" });
        let baseline_start = Instant::now();
        let baseline = sandbox.baseline()?;
        self.events.on_test_run_complete(&TestRunCompleteEvent {
            label: "baseline",
            exit_code: baseline.exit_code,
            failure_count: baseline.failures.len(),
            duration_ms: baseline_start.elapsed().as_millis() as u64,
        });

        mutator.delete_symbols(symbol_plans)?;
        let removed_orphans = mutator.delete_orphan_files(orphan_plans)?;
        for path in &removed_orphans {
            self.events.on_file_mutated(&janitor_core::events::types::FileMutatedEvent {
                path: self.project_root.join(path),
                entities_removed: 0,
            });
        }

        self.events.on_test_run_started(&TestRunStartedEvent { label: "verify" });
        let verify_start = Instant::now();
        let verification = sandbox.verify()?;
        self.events.on_test_run_complete(&TestRunCompleteEvent {
            label: "verify",
            exit_code: verification.exit_code,
            failure_count: verification.failures.len(),
            duration_ms: verify_start.elapsed().as_millis() as u64,
        });

        let verdict = evaluate(&baseline, &verification);
        let files_touched = mutator.touched_count();

        let (outcome, exit_code, mutation_outcome) = match verdict {
            MutationVerdict::Accept => {
                let entities_removed = audit_report.dead_symbols.len();
                mutator.commit()?;
                (
                    CleanOutcome::Committed {
                        files_touched,
                        entities_removed,
                    },
                    0,
                    MutationOutcome::Committed,
                )
            }
            MutationVerdict::RollbackNewFailures { new_failures } => {
                let errors = mutator.restore_all();
                if !errors.is_empty() {
                    self.events.on_error(&EngineErrorEvent {
                        message: format!("{} file(s) failed to restore after rollback", errors.len()),
                    });
                }
                let reason = format!("{} new test failure(s) after mutation", new_failures.len());
                (
                    CleanOutcome::RolledBack {
                        reason: reason.clone(),
                        files_touched,
                    },
                    1,
                    MutationOutcome::RolledBack { reason },
                )
            }
            MutationVerdict::RollbackCollectionError => {
                let errors = mutator.restore_all();
                if !errors.is_empty() {
                    self.events.on_error(&EngineErrorEvent {
                        message: format!("{} file(s) failed to restore after rollback", errors.len()),
                    });
                }
                let reason = "test collection failed after mutation".to_string();
                (
                    CleanOutcome::RolledBack {
                        reason: reason.clone(),
                        files_touched,
                    },
                    2,
                    MutationOutcome::RolledBack { reason },
                )
            }
        };

        self.events.on_mutation_session_ended(&MutationSessionEndedEvent {
            session_id,
            outcome: mutation_outcome,
        });
        drop(guard);

        Ok(CleanReport {
            audit: audit_report,
            outcome,
            exit_code,
        })
    }

    fn build_symbol_plans(&self, dead_entities: &[Entity]) -> Result<Vec<FileMutationPlan>, EngineError> {
        let mut by_file: FxHashMap<String, Vec<Entity>> = FxHashMap::default();
        for entity in dead_entities {
            by_file
                .entry(entity.file_path.clone())
                .or_default()
                .push(entity.clone());
        }

        let mut plans = Vec::with_capacity(by_file.len());
        for (relative_path, entities) in by_file {
            let absolute_path = self.project_root.join(&relative_path);
            let bytes = std::fs::read(&absolute_path).map_err(|source| {
                EngineError::Analysis(AnalysisError::Io {
                    path: relative_path.clone(),
                    source,
                })
            })?;
            let language = Language::from_path(&absolute_path).unwrap_or(Language::Python);
            plans.push(FileMutationPlan {
                relative_path,
                absolute_path,
                expected_content_hash: hash_content(&bytes),
                entities,
                language: language.to_core(),
            });
        }
        Ok(plans)
    }

    fn build_orphan_plans(&self, audit: &AuditReport) -> Result<Vec<OrphanFilePlan>, EngineError> {
        let mut plans = Vec::with_capacity(audit.orphan_files.len());
        for relative_path in &audit.orphan_files {
            let absolute_path = self.project_root.join(relative_path);
            let bytes = std::fs::read(&absolute_path).map_err(|source| {
                EngineError::Analysis(AnalysisError::Io {
                    path: relative_path.clone(),
                    source,
                })
            })?;
            plans.push(OrphanFilePlan {
                relative_path: relative_path.clone(),
                absolute_path,
                expected_content_hash: hash_content(&bytes),
            });
        }
        Ok(plans)
    }
}

fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn now_nanos() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
