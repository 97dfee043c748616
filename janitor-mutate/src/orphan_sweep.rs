//! Orphan-import sweep (§4.10 step 5): after splicing dead entities out of
//! a file, remove any import statement that, after the splice, references
//! only removed names. No teacher counterpart — `drift` never mutates
//! source — built from scratch in the same line-oriented, conservative
//! style as the rest of this crate: a whole-statement regex match per
//! language, and a name is swept only if it no longer appears anywhere
//! else in the post-splice buffer (so re-export or re-use of the same
//! bare name elsewhere in the file keeps its import alive).

use std::collections::HashSet;

use regex::Regex;

use janitor_core::types::entity::Language;

fn python_import_line() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:from[ \t]+\S+[ \t]+)?import[ \t]+([A-Za-z_][\w, \t]*(?:as[ \t]+\w+)?(?:,[ \t]*[A-Za-z_][\w ]*(?:as[ \t]+\w+)?)*)[ \t]*(?:#.*)?$").unwrap()
    })
}

fn js_named_import_line() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^[ \t]*import[ \t]*\{([^}]*)\}[ \t]*from[ \t]*['"][^'"]+['"];?[ \t]*$"#).unwrap()
    })
}

/// Bound local names of one Python import clause, honoring `as` aliases
/// (the alias is what can appear unused in the body, not the original
/// name).
fn python_bound_names(clause: &str) -> Vec<String> {
    clause
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            if let Some((_, alias)) = part.split_once(" as ") {
                Some(alias.trim().to_string())
            } else {
                // Bare `import a.b.c` binds the top-level package name `a`;
                // `from x import name` binds `name` directly. Both reduce
                // to the first dotted segment for sweep purposes.
                Some(part.split('.').next().unwrap_or(part).trim().to_string())
            }
        })
        .collect()
}

fn js_bound_names(clause: &str) -> Vec<String> {
    clause
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            if let Some((_, alias)) = part.split_once(" as ") {
                Some(alias.trim().to_string())
            } else {
                Some(part.to_string())
            }
        })
        .collect()
}

/// Count occurrences of `name` as a whole identifier in `text` (word
/// boundaries on both sides), used to decide whether a name is still
/// referenced anywhere outside the import line itself.
fn occurs_as_identifier(text: &str, name: &str) -> usize {
    if name.is_empty() {
        return 0;
    }
    let bytes = text.as_bytes();
    let nbytes = name.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while let Some(pos) = find_from(bytes, nbytes, i) {
        let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
        let after = pos + nbytes.len();
        let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
        if before_ok && after_ok {
            count += 1;
        }
        i = pos + 1;
    }
    count
}

fn is_ident_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Remove every import line whose bound names are *all* in `removed_names`
/// and none of which occurs anywhere else in `buffer` (§4.10 step 5).
/// `buffer` must already be the post-splice content.
pub fn sweep(buffer: &str, removed_names: &HashSet<String>, language: Language) -> String {
    if removed_names.is_empty() {
        return buffer.to_string();
    }

    let (re, bind_names): (&Regex, fn(&str) -> Vec<String>) = match language {
        Language::Python => (python_import_line(), python_bound_names as fn(&str) -> Vec<String>),
        Language::JavaScriptTypeScript => {
            (js_named_import_line(), js_bound_names as fn(&str) -> Vec<String>)
        }
    };

    let mut lines_to_drop: Vec<(usize, usize)> = Vec::new();
    for caps in re.captures_iter(buffer) {
        let whole = caps.get(0).unwrap();
        let clause = caps.get(1).unwrap().as_str();
        let names = bind_names(clause);
        if names.is_empty() {
            continue;
        }
        let all_removed = names.iter().all(|n| removed_names.contains(n));
        if !all_removed {
            continue;
        }
        let rest_without_line = format!(
            "{}{}",
            &buffer[..whole.start()],
            &buffer[whole.end()..]
        );
        let still_used = names
            .iter()
            .any(|n| occurs_as_identifier(&rest_without_line, n) > 0);
        if !still_used {
            lines_to_drop.push((whole.start(), whole.end()));
        }
    }

    if lines_to_drop.is_empty() {
        return buffer.to_string();
    }

    let mut out = String::with_capacity(buffer.len());
    let mut cursor = 0;
    for (start, mut end) in lines_to_drop {
        if start < cursor {
            continue;
        }
        // Swallow one trailing newline so the sweep doesn't leave a blank
        // line behind where the import used to be.
        if buffer[end..].starts_with('\n') {
            end += 1;
        }
        out.push_str(&buffer[cursor..start]);
        cursor = end;
    }
    out.push_str(&buffer[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweeps_fully_unused_python_import() {
        let mut removed = HashSet::new();
        removed.insert("helper".to_string());
        let src = "from a import helper\n\ndef run():\n    return 1\n";
        let swept = sweep(src, &removed, Language::Python);
        assert!(!swept.contains("import helper"));
        assert!(swept.contains("def run()"));
    }

    #[test]
    fn keeps_import_still_used_elsewhere() {
        let mut removed = HashSet::new();
        removed.insert("helper".to_string());
        let src = "from a import helper\n\ndef run():\n    return helper()\n";
        let swept = sweep(src, &removed, Language::Python);
        assert!(swept.contains("import helper"));
    }

    #[test]
    fn sweeps_js_named_import_when_all_names_removed() {
        let mut removed = HashSet::new();
        removed.insert("unused".to_string());
        let src = "import { unused } from './util';\n\nexport function run() { return 1; }\n";
        let swept = sweep(src, &removed, Language::JavaScriptTypeScript);
        assert!(!swept.contains("import {"));
    }

    #[test]
    fn keeps_js_named_import_with_surviving_sibling() {
        let mut removed = HashSet::new();
        removed.insert("unused".to_string());
        let src = "import { unused, used } from './util';\n\nexport function run() { return used(); }\n";
        let swept = sweep(src, &removed, Language::JavaScriptTypeScript);
        assert!(swept.contains("import { unused, used }"));
    }
}
