//! `WisdomRegistry` — answers `is_immortal(name, source_text, language)`
//! (§4.3). Community packs are embedded at compile time; premium packs load
//! from an optional directory at runtime, the same built-in-vs-custom split
//! as `drift-analysis`'s `FrameworkPackRegistry`.

use std::path::Path;

use janitor_core::errors::DetectionError;

use super::matcher::{CompiledMatcher, SubstringSource};
use super::types::RulePack;
use crate::parser::Language;

const COMMUNITY_PYTHON_PACK: &str = include_str!("packs/community_python.json");
const COMMUNITY_JS_PACK: &str = include_str!("packs/community_js.json");

/// The reason a symbol is immortal per the Wisdom Registry. Every variant
/// protects under the pipeline's single `WisdomRule` tag (§4.8 shield 2);
/// the fields here exist so a report can explain *why*.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmortalityReason {
    /// Which resolution step matched, in §4.3's declared order.
    pub step: &'static str,
    /// Framework/category name, or the literal matched text for dunder /
    /// builtin-decorator steps that have no associated framework.
    pub detail: String,
}

impl ImmortalityReason {
    pub const TAG: &'static str = "WisdomRule";
}

pub struct WisdomRegistry {
    python: CompiledMatcher,
    js: CompiledMatcher,
}

impl WisdomRegistry {
    /// Community packs only — always available, never fails since they're
    /// embedded and parsed once here.
    pub fn community_only() -> Self {
        let python_pack = parse_pack(COMMUNITY_PYTHON_PACK, "community_python.json")
            .expect("embedded community pack must parse");
        let js_pack = parse_pack(COMMUNITY_JS_PACK, "community_js.json")
            .expect("embedded community pack must parse");
        Self {
            python: CompiledMatcher::compile(&[python_pack]),
            js: CompiledMatcher::compile(&[js_pack]),
        }
    }

    /// Community packs plus every `*.json` file found directly under
    /// `premium_dir` (§4.3, §6: "premium tier (loaded if present)").
    /// A malformed premium pack is skipped with a logged warning rather
    /// than aborting the whole registry load.
    pub fn with_premium_dir(premium_dir: &Path) -> Self {
        let mut python_packs =
            vec![parse_pack(COMMUNITY_PYTHON_PACK, "community_python.json")
                .expect("embedded community pack must parse")];
        let mut js_packs = vec![parse_pack(COMMUNITY_JS_PACK, "community_js.json")
            .expect("embedded community pack must parse")];

        if premium_dir.is_dir() {
            if let Ok(entries) = std::fs::read_dir(premium_dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    let Ok(text) = std::fs::read_to_string(&path) else {
                        continue;
                    };
                    match parse_pack(&text, &path.display().to_string()) {
                        Ok(pack) => {
                            // A premium pack without a language hint in its
                            // file name is loaded into both matchers; the
                            // cost is a handful of extra patterns.
                            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                            if name.contains("python") {
                                python_packs.push(pack);
                            } else if name.contains("js") || name.contains("javascript") || name.contains("typescript") {
                                js_packs.push(pack);
                            } else {
                                python_packs.push(pack.clone());
                                js_packs.push(pack);
                            }
                        }
                        Err(err) => {
                            tracing::warn!(path = %path.display(), error = %err, "skipping malformed premium rule pack");
                        }
                    }
                }
            }
        }

        Self {
            python: CompiledMatcher::compile(&python_packs),
            js: CompiledMatcher::compile(&js_packs),
        }
    }

    fn matcher_for(&self, language: Language) -> &CompiledMatcher {
        if language.is_python() {
            &self.python
        } else {
            &self.js
        }
    }

    /// Resolution order (§4.3): exact name -> prefix -> decorator substring
    /// -> suffix on any decorator line -> syntax marker -> dunder -> builtin
    /// property/staticmethod/classmethod decorator. First match wins.
    pub fn is_immortal(
        &self,
        name: &str,
        source_text: &str,
        language: Language,
    ) -> Option<ImmortalityReason> {
        let m = self.matcher_for(language);

        if m.exact_match(name) {
            return Some(ImmortalityReason {
                step: "exact_name",
                detail: name.to_string(),
            });
        }

        if m.prefix_match(name) {
            return Some(ImmortalityReason {
                step: "prefix",
                detail: name.to_string(),
            });
        }

        if let Some(hit) = m.first_substring_hit(source_text, &[SubstringSource::DecoratorRule]) {
            return Some(ImmortalityReason {
                step: "decorator_substring",
                detail: format!("{} ({})", hit.framework, hit.pattern),
            });
        }

        if m.suffix_match_decorator_line(source_text) || m.suffix_match_name(name) {
            return Some(ImmortalityReason {
                step: "suffix",
                detail: name.to_string(),
            });
        }

        if let Some(hit) = m.first_substring_hit(
            source_text,
            &[
                SubstringSource::SyntaxMarkerRule,
                SubstringSource::MetaSyntaxMarker,
                SubstringSource::FrameworkKeyedMarker,
            ],
        ) {
            return Some(ImmortalityReason {
                step: "syntax_marker",
                detail: format!("{} ({})", hit.framework, hit.pattern),
            });
        }

        if name.starts_with("__") && name.ends_with("__") && name.len() > 4 {
            return Some(ImmortalityReason {
                step: "dunder",
                detail: name.to_string(),
            });
        }

        if source_text.contains("@property")
            || source_text.contains("@staticmethod")
            || source_text.contains("@classmethod")
        {
            return Some(ImmortalityReason {
                step: "builtin_decorator",
                detail: "property/staticmethod/classmethod".to_string(),
            });
        }

        None
    }
}

impl Default for WisdomRegistry {
    fn default() -> Self {
        Self::community_only()
    }
}

fn parse_pack(text: &str, label: &str) -> Result<RulePack, DetectionError> {
    serde_json::from_str(text).map_err(|source| DetectionError::InvalidJson {
        path: label.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pytest_fixture_protected() {
        let reg = WisdomRegistry::community_only();
        let reason = reg.is_immortal("db", "@pytest.fixture\ndef db(): ...", Language::Python);
        assert!(reason.is_some());
    }

    #[test]
    fn unrelated_private_helper_not_protected() {
        let reg = WisdomRegistry::community_only();
        let reason = reg.is_immortal("_helper", "def _helper(self): return 1", Language::Python);
        assert!(reason.is_none());
    }

    #[test]
    fn dunder_protected_when_long_enough() {
        let reg = WisdomRegistry::community_only();
        let reason = reg.is_immortal("__init__", "def __init__(self): ...", Language::Python);
        assert_eq!(reason.unwrap().step, "dunder");
    }

    #[test]
    fn js_react_hook_protected_by_prefix() {
        let reg = WisdomRegistry::community_only();
        let reason = reg.is_immortal(
            "useCustomThing",
            "function useCustomThing() { useEffect(() => {}); }",
            Language::JavaScript,
        );
        assert!(reason.is_some());
    }
}
