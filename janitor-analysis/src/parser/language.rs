//! Language detection by file extension (§4.1).

use std::path::Path;

/// The two language families this engine understands. Python and
/// JavaScript/TypeScript are treated as one family for resolution purposes
/// (`.js`/`.jsx`/`.ts`/`.tsx` all route through the same extractor and
/// depgraph resolver, matching §4.5's combined JS/TS resolution rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    /// `.tsx`/`.jsx` — parsed with the TSX/JSX grammar variant but otherwise
    /// treated identically to their non-JSX sibling.
    Jsx,
    Tsx,
}

impl Language {
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        match ext? {
            "py" | "pyi" => Some(Self::Python),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension().and_then(|e| e.to_str()))
    }

    pub fn is_python(self) -> bool {
        matches!(self, Self::Python)
    }

    pub fn is_js_family(self) -> bool {
        matches!(self, Self::JavaScript | Self::TypeScript | Self::Jsx | Self::Tsx)
    }

    /// The source-file extensions belonging to this language's family, used
    /// by the grep shield (§4.8 shield 5, §9 open question 2) to exclude
    /// same-language source files from the "mentioned in a non-source file"
    /// check.
    pub fn family_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py", "pyi"],
            Self::JavaScript | Self::Jsx => &["js", "mjs", "cjs", "jsx"],
            Self::TypeScript | Self::Tsx => &["ts", "mts", "cts", "tsx"],
        }
    }

    /// Converts to the core crate's coarser `Language`, used wherever a type
    /// crosses into `janitor-core` (e.g. `EntityKind::declaration_keywords`).
    pub fn to_core(self) -> janitor_core::types::entity::Language {
        match self {
            Self::Python => janitor_core::types::entity::Language::Python,
            Self::JavaScript | Self::TypeScript | Self::Jsx | Self::Tsx => {
                janitor_core::types::entity::Language::JavaScriptTypeScript
            }
        }
    }

    fn ts_grammar(self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript | Self::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub(crate) fn new_parser(self) -> Result<tree_sitter::Parser, tree_sitter::LanguageError> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&self.ts_grammar())?;
        Ok(parser)
    }
}
