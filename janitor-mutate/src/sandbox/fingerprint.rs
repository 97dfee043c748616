//! Test fingerprinting (§4.11): parses failing test identifiers out of
//! runner output with per-runner regexes, producing a `Set<TestId>` the
//! sandbox diffs before vs. after mutation.

use std::collections::HashSet;

use regex::Regex;

fn pytest_failure_line() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^(?:FAILED|ERROR) ([^\s]+::[^\s]+)").unwrap())
}

fn mocha_jest_failure_line() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:\d+\)|✗|✖|●)\s*(.+?)\s*$").unwrap()
    })
}

/// Which runner family produced `output`, so the right regex is applied.
/// Detected from characteristic banner text rather than threaded through
/// as a separate parameter — the sandbox already knows which command it
/// ran, but the fingerprint parser is kept runner-agnostic so it can also
/// be used to replay captured output from an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerFamily {
    Pytest,
    MochaOrJest,
}

pub fn parse_failures(output: &str, family: RunnerFamily) -> HashSet<String> {
    let re = match family {
        RunnerFamily::Pytest => pytest_failure_line(),
        RunnerFamily::MochaOrJest => mocha_jest_failure_line(),
    };
    re.captures_iter(output)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Infer the runner family from the command that was actually run, falling
/// back to sniffing the output for `pytest`'s own banner.
pub fn family_for_command(command: &[String], output: &str) -> RunnerFamily {
    let joined = command.join(" ");
    if joined.contains("pytest") {
        return RunnerFamily::Pytest;
    }
    if joined.contains("npm") || joined.contains("yarn") || joined.contains("pnpm") || joined.contains("jest") || joined.contains("mocha") {
        return RunnerFamily::MochaOrJest;
    }
    if output.contains("pytest") {
        RunnerFamily::Pytest
    } else {
        RunnerFamily::MochaOrJest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pytest_failed_and_error_lines() {
        let output = "\
collected 3 items

FAILED tests/test_a.py::test_one - assert False
ERROR tests/test_b.py::test_two - ImportError
";
        let failures = parse_failures(output, RunnerFamily::Pytest);
        assert!(failures.contains("tests/test_a.py::test_one"));
        assert!(failures.contains("tests/test_b.py::test_two"));
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn parses_mocha_style_bullets() {
        let output = "\
  2 passing
  1 failing

  1) Suite thing should work:
     AssertionError
";
        let failures = parse_failures(output, RunnerFamily::MochaOrJest);
        assert!(failures.iter().any(|f| f.contains("Suite thing should work")));
    }

    #[test]
    fn empty_output_yields_empty_set() {
        assert!(parse_failures("", RunnerFamily::Pytest).is_empty());
    }
}
