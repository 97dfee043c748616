//! Test Sandbox (C11, §4.11). Runs the project's test command in a
//! subprocess, parses and diffs failure sets, and decides whether a
//! mutation is accepted. No dedicated process-management crate needed —
//! `std::process::Command` with a manual `try_wait` poll loop, matching the
//! teacher's own preference for stdlib process handling over a
//! process-management crate (the teacher's subprocess use is stdlib-only).

pub mod fingerprint;
pub mod runner;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use janitor_core::constants::PYTEST_COLLECTION_ERROR_EXIT_CODE;
use janitor_core::errors::SandboxError;

pub use fingerprint::{family_for_command, parse_failures, RunnerFamily};
pub use runner::detect_test_command;

/// The prefix this tool's own environment variables carry; none of them
/// may leak into the test subprocess's environment (§4.11: "a cleaned
/// environment (no variables bearing the tool's own prefix leak in)").
const OWN_ENV_PREFIX: &str = "JANITOR_";

/// Result of one test run: the raw exit code, the merged stdout+stderr
/// capture, and the parsed failure-identifier set (§4.11).
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub exit_code: i32,
    pub output: String,
    pub failures: HashSet<String>,
}

impl TestOutcome {
    /// §4.11: pytest's collection-error exit code (or the runner's
    /// equivalent) mandates rollback regardless of the failure-set diff.
    pub fn is_collection_error(&self) -> bool {
        self.exit_code == PYTEST_COLLECTION_ERROR_EXIT_CODE
    }
}

/// The accept/reject decision for one mutation session (§4.11, §7).
#[derive(Debug, Clone)]
pub enum MutationVerdict {
    Accept,
    RollbackNewFailures { new_failures: HashSet<String> },
    RollbackCollectionError,
}

/// Decide whether `current` (the post-mutation run) accepts the mutation
/// against `baseline` (§4.11): "accepted iff `current_failure_set -
/// baseline_failure_set` is empty *and* the exit code is not a collection
/// error."
pub fn evaluate(baseline: &TestOutcome, current: &TestOutcome) -> MutationVerdict {
    if current.is_collection_error() {
        return MutationVerdict::RollbackCollectionError;
    }
    let new_failures: HashSet<String> = current
        .failures
        .difference(&baseline.failures)
        .cloned()
        .collect();
    if new_failures.is_empty() {
        MutationVerdict::Accept
    } else {
        MutationVerdict::RollbackNewFailures { new_failures }
    }
}

pub struct TestSandbox {
    project_root: PathBuf,
    command: Vec<String>,
    timeout: Duration,
}

impl TestSandbox {
    pub fn new(project_root: &Path, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            command,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn autodetect(
        project_root: &Path,
        custom: Option<&[String]>,
        timeout_secs: u64,
    ) -> Result<Self, SandboxError> {
        let command = detect_test_command(project_root, custom).ok_or(SandboxError::NoRunnerDetected)?;
        Ok(Self::new(project_root, command, timeout_secs))
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// §4.11: "`baseline()` runs once before mutation, returning
    /// `(exit_code, failure_set)`."
    pub fn baseline(&self) -> Result<TestOutcome, SandboxError> {
        self.run()
    }

    /// §4.11: "`verify()` runs after mutation"; mechanically identical to
    /// `baseline()`, kept as a distinct method so call sites read as the
    /// protocol they implement rather than two anonymous test runs.
    pub fn verify(&self) -> Result<TestOutcome, SandboxError> {
        self.run()
    }

    fn run(&self) -> Result<TestOutcome, SandboxError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(SandboxError::NoRunnerDetected);
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.env_clear();
        for (key, value) in std::env::vars() {
            if !key.starts_with(OWN_ENV_PREFIX) {
                cmd.env(key, value);
            }
        }

        let mut child = cmd
            .spawn()
            .map_err(|source| SandboxError::SpawnFailed {
                command: self.command.join(" "),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        let exit_status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        break None;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(_) => break None,
            }
        };

        let Some(status) = exit_status else {
            return Err(SandboxError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            });
        };

        let output = child.wait_with_output().ok();
        let (stdout, stderr) = match output {
            Some(o) => (o.stdout, o.stderr),
            None => (Vec::new(), Vec::new()),
        };
        let mut combined = String::from_utf8_lossy(&stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&stderr));

        let exit_code = status.code().unwrap_or(-1);
        let family = family_for_command(&self.command, &combined);
        let failures = parse_failures(&combined, family);

        if exit_code == PYTEST_COLLECTION_ERROR_EXIT_CODE {
            // §7 TestCollectionError: "treat as new-failure-set = everything"
            // — the caller's `evaluate` already rolls back unconditionally
            // on `is_collection_error`, so the failure set itself need not
            // be synthesized further here.
            tracing::warn!(exit_code, "test runner reported a collection error");
        }

        Ok(TestOutcome {
            exit_code,
            output: combined,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: i32, failures: &[&str]) -> TestOutcome {
        TestOutcome {
            exit_code,
            output: String::new(),
            failures: failures.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn accepts_when_no_new_failures() {
        let baseline = outcome(0, &["a::test_x"]);
        let current = outcome(0, &["a::test_x"]);
        assert!(matches!(evaluate(&baseline, &current), MutationVerdict::Accept));
    }

    #[test]
    fn rejects_on_new_failure() {
        let baseline = outcome(1, &["a::test_x"]);
        let current = outcome(1, &["a::test_x", "a::test_y"]);
        match evaluate(&baseline, &current) {
            MutationVerdict::RollbackNewFailures { new_failures } => {
                assert!(new_failures.contains("a::test_y"));
                assert_eq!(new_failures.len(), 1);
            }
            other => panic!("expected rollback, got {other:?}"),
        }
    }

    #[test]
    fn collection_error_rolls_back_unconditionally() {
        let baseline = outcome(0, &[]);
        let current = outcome(PYTEST_COLLECTION_ERROR_EXIT_CODE, &[]);
        assert!(matches!(
            evaluate(&baseline, &current),
            MutationVerdict::RollbackCollectionError
        ));
    }

    #[test]
    fn a_real_command_runs_and_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = TestSandbox::new(dir.path(), vec!["true".to_string()], 5);
        let result = sandbox.baseline().unwrap();
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn own_env_prefix_is_stripped_from_subprocess_env() {
        std::env::set_var("JANITOR_SECRET_TOKEN", "should-not-leak");
        let dir = tempfile::tempdir().unwrap();
        let sandbox = TestSandbox::new(
            dir.path(),
            vec!["sh".to_string(), "-c".to_string(), "env".to_string()],
            5,
        );
        let result = sandbox.baseline().unwrap();
        std::env::remove_var("JANITOR_SECRET_TOKEN");
        assert!(!result.output.contains("JANITOR_SECRET_TOKEN"));
    }
}
