//! Textual extraction for Python config/DAG modules (`settings.py`,
//! `dags/*.py`), which aren't a structured data format the way YAML/JSON/
//! TOML are. Regex-based rather than CST-based: these files are scanned
//! for known assignment shapes only, never fed through the entity
//! extractor as part of this pass.

use std::sync::OnceLock;

use regex::Regex;

use super::value_walker::FoundValue;

fn list_assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)(INSTALLED_APPS|MIDDLEWARE)\s*=\s*\[(.*?)\]"#).unwrap()
    })
}

fn quoted_string_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']([A-Za-z0-9_.]+)["']"#).unwrap())
}

/// `python_callable=some_func` or `python_callable = "pkg.mod.func"` —
/// Airflow's operator kwarg, which may bind either a bare identifier
/// (a function object in scope) or a dotted string.
fn python_callable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"python_callable\s*=\s*(?:["']([A-Za-z0-9_.]+)["']|([A-Za-z_][A-Za-z0-9_.]*))"#)
            .unwrap()
    })
}

/// Extracts `INSTALLED_APPS`/`MIDDLEWARE` list entries and `python_callable`
/// bindings from raw Python source text (§4.4).
pub fn extract_from_python_source(source: &str, out: &mut Vec<FoundValue>) {
    for caps in list_assignment_re().captures_iter(source) {
        let key = caps[1].to_string();
        let body = &caps[2];
        for qs in quoted_string_re().captures_iter(body) {
            out.push(FoundValue {
                key: key.clone(),
                value: qs[1].to_string(),
            });
        }
    }

    for caps in python_callable_re().captures_iter(source) {
        let value = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string());
        if let Some(value) = value {
            out.push(FoundValue {
                key: "python_callable".to_string(),
                value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_installed_apps() {
        let src = "INSTALLED_APPS = [\n    'django.contrib.admin',\n    'myapp.apps.MyAppConfig',\n]";
        let mut out = Vec::new();
        extract_from_python_source(src, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].value, "myapp.apps.MyAppConfig");
    }

    #[test]
    fn extracts_python_callable_identifier() {
        let src = "PythonOperator(task_id='t', python_callable=process_data)";
        let mut out = Vec::new();
        extract_from_python_source(src, &mut out);
        assert_eq!(out[0].value, "process_data");
    }
}
