//! Config-Reference Scanner (C4, §4.4). Scans a fixed set of
//! infrastructure files at the project root (and one level deep), extracts
//! string values at known keys, and merges the results into the tracker as
//! synthetic `string`-kind candidate references. No direct teacher
//! counterpart — `drift` has no infra-config scanner — so this module is
//! grounded on the general "parse a fixed file set, extract known keys"
//! shape, using the same `serde_yaml`/`serde_json`/`toml` crates the
//! teacher already depends on for its own config loading.

mod python_text;
mod scanner;
mod value_walker;

pub use scanner::{ConfigReference, ConfigReferenceScanner};
