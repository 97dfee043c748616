//! Project-wide constants: excluded directories, immortal directories, and
//! the fixed set of infrastructure config files the scanner knows about.
//!
//! Kept as plain slices rather than a config-loaded list because §4.5 and
//! §4.6 specify these names as part of the engine's behavior, not as
//! user-tunable policy. `ScanConfig::extra_ignore` layers user patterns on
//! top of, never instead of, this list.

/// Directories excluded wholesale from scanning and the dependency graph
/// (§4.5). Matched by exact path-segment name, not substring.
pub const EXCLUDED_DIRS: &[&str] = &[
    "venv",
    ".venv",
    "env",
    "vendor",
    "node_modules",
    "__pycache__",
    "site-packages",
    "dist",
    "build",
    ".tox",
    ".git",
    ".janitor_cache",
    ".janitor_trash",
];

/// Directories whose contents are never classified dead, regardless of
/// reference count (§4.6, GLOSSARY "Immortal directory").
pub const IMMORTAL_DIRS: &[&str] = &[
    "tests",
    "test",
    "examples",
    "docs",
    "scripts",
    "benchmarks",
    "tutorial",
    "migrations",
];

/// Infrastructure files the Config-Reference Scanner (§4.4) looks for at the
/// project root and one level deep.
pub const SCANNED_CONFIG_FILES: &[&str] = &[
    "serverless.yml",
    "serverless.yaml",
    "template.yaml",
    "template.yml",
    "docker-compose.yml",
    "docker-compose.yaml",
    "settings.py",
    "package.json",
    "tsconfig.json",
    "pyproject.toml",
];

/// Directory whose `*.py` modules are scanned as Airflow DAG modules (§4.4,
/// §6).
pub const DAG_DIR: &str = "dags";

/// GitHub Actions workflow directory, scanned as a config source (§6).
pub const GITHUB_WORKFLOWS_DIR: &str = ".github/workflows";

/// Known config keys the scanner extracts string values from, along with
/// the format they're found in (§4.4). `handler`-style keys appear in YAML
/// infra descriptors; `INSTALLED_APPS`/`MIDDLEWARE` in Python settings
/// modules; `scripts`/`bin` and packaging entry points in `package.json` /
/// `pyproject.toml`.
pub const CONFIG_REFERENCE_KEYS: &[&str] = &[
    "handler",
    "python_callable",
    "command",
    "INSTALLED_APPS",
    "MIDDLEWARE",
    "scripts",
    "bin",
    "entry_points",
    "console_scripts",
];

/// Name of the on-disk cache directory created under the project root
/// (§6).
pub const CACHE_DIR_NAME: &str = ".janitor_cache";

/// Name of the on-disk cache database file within [`CACHE_DIR_NAME`].
pub const CACHE_DB_NAME: &str = "analysis.db";

/// Name of the trash/backup directory created under the project root for a
/// mutation session (§6).
pub const TRASH_DIR_NAME: &str = ".janitor_trash";

/// Default wall-clock timeout for the test sandbox (§4.11): five minutes.
pub const DEFAULT_TEST_TIMEOUT_SECS: u64 = 300;

/// pytest's exit code for a collection error — mandates rollback
/// unconditionally regardless of the failure-set diff (§4.11).
pub const PYTEST_COLLECTION_ERROR_EXIT_CODE: i32 = 2;
