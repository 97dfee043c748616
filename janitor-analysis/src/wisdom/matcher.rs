//! Compiled pattern matcher backing one language's merged rule packs.
//!
//! Builds a single Aho-Corasick automaton over every substring pattern
//! (decorator rules, syntax-marker rules, meta-pattern syntax markers, and
//! framework-keyed syntax markers) once at load time, per §4.3's
//! performance contract ("near-linear on pattern count for substring
//! searches... back the substring search with a multi-pattern matcher").
//! Grounded on `drift-analysis`'s `frameworks/matcher.rs` visitor-style
//! signal evaluation, generalized from framework-detection signals to
//! immortality reasons.

use aho_corasick::AhoCorasick;

use super::types::{ImmortalityRuleType, RulePack};

/// One substring pattern's provenance, carried alongside the automaton so a
/// match can be turned back into a human-readable reason.
#[derive(Debug, Clone)]
pub struct SubstringHit {
    pub framework: String,
    pub pattern: String,
    pub source: SubstringSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstringSource {
    DecoratorRule,
    SyntaxMarkerRule,
    MetaSyntaxMarker,
    FrameworkKeyedMarker,
}

/// Merged, compiled view over every rule pack loaded for one language.
pub struct CompiledMatcher {
    exact_names: Vec<String>,
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    substring_automaton: AhoCorasick,
    substring_hits: Vec<SubstringHit>,
}

impl CompiledMatcher {
    pub fn compile(packs: &[RulePack]) -> Self {
        let mut exact_names = Vec::new();
        let mut prefixes = Vec::new();
        let mut suffixes = Vec::new();
        let mut patterns: Vec<String> = Vec::new();
        let mut substring_hits = Vec::new();

        for pack in packs {
            exact_names.extend(pack.meta_patterns.exact_matches.iter().cloned());
            prefixes.extend(pack.meta_patterns.prefix_matches.iter().cloned());
            suffixes.extend(pack.meta_patterns.suffix_matches.iter().cloned());

            for rule in &pack.immortality_rules {
                let source = match rule.rule_type {
                    ImmortalityRuleType::Decorator => SubstringSource::DecoratorRule,
                    ImmortalityRuleType::SyntaxMarker => SubstringSource::SyntaxMarkerRule,
                };
                for pattern in &rule.patterns {
                    patterns.push(pattern.clone());
                    substring_hits.push(SubstringHit {
                        framework: rule.framework.clone(),
                        pattern: pattern.clone(),
                        source,
                    });
                }
            }

            for marker in &pack.meta_patterns.syntax_markers {
                patterns.push(marker.clone());
                substring_hits.push(SubstringHit {
                    framework: "meta".to_string(),
                    pattern: marker.clone(),
                    source: SubstringSource::MetaSyntaxMarker,
                });
            }

            for (framework, entry) in &pack.framework_keyed {
                for marker in &entry.syntax_markers {
                    patterns.push(marker.clone());
                    substring_hits.push(SubstringHit {
                        framework: framework.clone(),
                        pattern: marker.clone(),
                        source: SubstringSource::FrameworkKeyedMarker,
                    });
                }
            }
        }

        // An empty pattern set still needs a valid automaton; AhoCorasick
        // accepts zero patterns and simply never matches.
        let substring_automaton = AhoCorasick::new(&patterns)
            .expect("rule-pack patterns are plain literals, never invalid regex");

        Self {
            exact_names,
            prefixes,
            suffixes,
            substring_automaton,
            substring_hits,
        }
    }

    pub fn exact_match(&self, name: &str) -> bool {
        self.exact_names.iter().any(|p| p == name)
    }

    /// Prefix match against `name` directly, or against the segment after
    /// the last `.` in a qualified name (§4.3: "including the segment
    /// after the last `.` in a qualified name").
    pub fn prefix_match(&self, name: &str) -> bool {
        let last_segment = name.rsplit('.').next().unwrap_or(name);
        self.prefixes
            .iter()
            .any(|p| name.starts_with(p.as_str()) || last_segment.starts_with(p.as_str()))
    }

    pub fn suffix_match_name(&self, name: &str) -> bool {
        self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// Suffix match against any line in `source_text` that looks like a
    /// decorator line (starts with `@` once leading whitespace is
    /// trimmed), per §4.3's "suffix match on any decorator line".
    pub fn suffix_match_decorator_line(&self, source_text: &str) -> bool {
        source_text
            .lines()
            .map(str::trim_start)
            .filter(|line| line.starts_with('@'))
            .any(|line| self.suffixes.iter().any(|s| line.trim_end().ends_with(s.as_str())))
    }

    /// First substring hit of the given source kinds within `source_text`,
    /// scanning with the pre-built automaton rather than one substring
    /// search per pattern.
    pub fn first_substring_hit(
        &self,
        source_text: &str,
        sources: &[SubstringSource],
    ) -> Option<&SubstringHit> {
        self.substring_automaton
            .find_iter(source_text)
            .filter_map(|m| self.substring_hits.get(m.pattern().as_usize()))
            .find(|hit| sources.contains(&hit.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wisdom::types::{ImmortalityRule, MetaPatterns};

    fn sample_pack() -> RulePack {
        RulePack {
            immortality_rules: vec![ImmortalityRule {
                framework: "pytest".into(),
                patterns: vec!["@pytest.fixture".into()],
                rule_type: ImmortalityRuleType::Decorator,
                action: "protect".into(),
            }],
            meta_patterns: MetaPatterns {
                exact_matches: vec!["main".into()],
                suffix_matches: vec!["_handler".into()],
                prefix_matches: vec!["test_".into()],
                syntax_markers: vec!["__tablename__".into()],
            },
            framework_keyed: Default::default(),
        }
    }

    #[test]
    fn exact_and_prefix_match() {
        let m = CompiledMatcher::compile(&[sample_pack()]);
        assert!(m.exact_match("main"));
        assert!(m.prefix_match("test_something"));
        assert!(m.prefix_match("Class.test_something"));
        assert!(!m.prefix_match("something_else"));
    }

    #[test]
    fn decorator_substring_hit() {
        let m = CompiledMatcher::compile(&[sample_pack()]);
        let hit = m.first_substring_hit(
            "@pytest.fixture\ndef db(): ...",
            &[SubstringSource::DecoratorRule],
        );
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().framework, "pytest");
    }

    #[test]
    fn suffix_on_decorator_line() {
        let m = CompiledMatcher::compile(&[sample_pack()]);
        assert!(m.suffix_match_decorator_line("@on_save_handler\ndef f(): ..."));
        assert!(!m.suffix_match_decorator_line("@something_else\ndef f(): ..."));
    }
}
