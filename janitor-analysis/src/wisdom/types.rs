//! Rule-pack JSON shapes (§4.3, §6). One file may define any subset of the
//! three shapes; community packs are embedded, premium packs are loaded
//! from an optional directory at runtime — the split mirrors
//! `drift-analysis`'s `frameworks/registry.rs` built-in-vs-custom loading.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImmortalityRuleType {
    Decorator,
    SyntaxMarker,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImmortalityRule {
    pub framework: String,
    pub patterns: Vec<String>,
    #[serde(rename = "type")]
    pub rule_type: ImmortalityRuleType,
    pub action: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaPatterns {
    #[serde(default)]
    pub exact_matches: Vec<String>,
    #[serde(default)]
    pub suffix_matches: Vec<String>,
    #[serde(default)]
    pub prefix_matches: Vec<String>,
    #[serde(default)]
    pub syntax_markers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameworkKeyedEntry {
    #[serde(default)]
    pub syntax_markers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulePack {
    #[serde(default)]
    pub immortality_rules: Vec<ImmortalityRule>,
    #[serde(default)]
    pub meta_patterns: MetaPatterns,
    #[serde(default)]
    pub framework_keyed: HashMap<String, FrameworkKeyedEntry>,
}
