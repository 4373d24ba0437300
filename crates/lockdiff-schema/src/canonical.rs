//! Single-line canonical form of a package entry.
//!
//! ```text
//! <install path>: [<name>@<version> | <version>] [(<k1>, <k2>=<json>, ...)]
//! ```
//!
//! Remaining fields are sorted by key, so two entries holding the same
//! fields and values render identically whatever their source order was.

use crate::document::{LockError, PackageEntry};
use crate::types::CanonicalRepr;
use serde_json::Value;
use std::fmt::Write;

const NAME_FIELD: &str = "name";
const VERSION_FIELD: &str = "version";

/// Render `entry`, found at `install_path`, in canonical form.
///
/// Boolean flags must be `true` (the lockfile writer omits false flags);
/// a `false` or `null` field is reported as a schema violation instead of
/// being coerced.
pub fn canonicalize(install_path: &str, entry: &PackageEntry) -> Result<CanonicalRepr, LockError> {
    let mut out = format!("{install_path}:");

    let name = identity_field(install_path, entry, NAME_FIELD)?;
    let version = identity_field(install_path, entry, VERSION_FIELD)?;
    match (name, version) {
        (Some(name), Some(version)) => {
            let _ = write!(out, " {name}@{version}");
        }
        (Some(name), None) => {
            let _ = write!(out, " {name}");
        }
        (None, Some(version)) => {
            let _ = write!(out, " {version}");
        }
        (None, None) => {}
    }

    let mut extras: Vec<(&String, &Value)> = entry
        .iter()
        .filter(|(k, _)| k.as_str() != NAME_FIELD && k.as_str() != VERSION_FIELD)
        .collect();
    extras.sort_by_key(|(key, _)| *key);

    let mut rendered = Vec::with_capacity(extras.len());
    for (key, value) in extras {
        rendered.push(render_extra(install_path, key, value)?);
    }
    if !rendered.is_empty() {
        let _ = write!(out, " ({})", rendered.join(", "));
    }

    Ok(CanonicalRepr::new(out))
}

/// `name` / `version`: absent and empty both count as missing.
fn identity_field<'a>(
    install_path: &str,
    entry: &'a PackageEntry,
    field: &str,
) -> Result<Option<&'a str>, LockError> {
    match entry.get(field) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(LockError::violation(
            install_path,
            field,
            format!("expected a string, found {}", kind_of(other)),
        )),
    }
}

fn render_extra(install_path: &str, key: &str, value: &Value) -> Result<String, LockError> {
    match value {
        Value::Bool(true) => Ok(key.to_owned()),
        Value::Bool(false) => Err(LockError::violation(
            install_path,
            key,
            "boolean flag set to false",
        )),
        Value::Null => Err(LockError::violation(install_path, key, "unexpected null")),
        Value::String(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Ok(format!("{key}={value}"))
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> PackageEntry {
        PackageEntry::new(value.as_object().unwrap().clone())
    }

    fn repr(path: &str, value: Value) -> String {
        canonicalize(path, &entry(value)).unwrap().into_inner()
    }

    #[test]
    fn version_only() {
        assert_eq!(
            repr("node_modules/foo", json!({"version": "1.2.3"})),
            "node_modules/foo: 1.2.3"
        );
    }

    #[test]
    fn name_and_version() {
        assert_eq!(
            repr("", json!({"name": "root", "version": "1.0.0"})),
            ": root@1.0.0"
        );
    }

    #[test]
    fn aliased_package_name() {
        assert_eq!(
            repr(
                "node_modules/string-width-cjs",
                json!({"name": "string-width", "version": "4.2.3"})
            ),
            "node_modules/string-width-cjs: string-width@4.2.3"
        );
    }

    #[test]
    fn name_without_version() {
        assert_eq!(repr("packages/a", json!({"name": "a"})), "packages/a: a");
    }

    #[test]
    fn empty_name_counts_as_missing() {
        assert_eq!(
            repr("node_modules/a", json!({"name": "", "version": "1.0.0"})),
            "node_modules/a: 1.0.0"
        );
    }

    #[test]
    fn no_identity_no_extras() {
        assert_eq!(repr("node_modules/a", json!({})), "node_modules/a:");
    }

    #[test]
    fn true_flags_render_as_bare_keys() {
        assert_eq!(
            repr(
                "node_modules/a",
                json!({"version": "1.0.0", "optional": true, "dev": true})
            ),
            "node_modules/a: 1.0.0 (dev, optional)"
        );
    }

    #[test]
    fn other_values_render_as_json() {
        assert_eq!(
            repr(
                "node_modules/a",
                json!({
                    "version": "1.0.0",
                    "resolved": "https://npm.example.com/a.tgz",
                    "link": true,
                    "inBundle": true,
                    "extraneous": true
                })
            ),
            "node_modules/a: 1.0.0 (extraneous, inBundle, link, resolved=\"https://npm.example.com/a.tgz\")"
        );
    }

    #[test]
    fn nested_values_render_compact() {
        assert_eq!(
            repr("node_modules/a", json!({"version": "1", "meta": {"x": [1, 2]}})),
            "node_modules/a: 1 (meta={\"x\":[1,2]})"
        );
    }

    #[test]
    fn extras_sort_ordinally() {
        assert_eq!(
            repr("p", json!({"b": 1, "B": 2, "a": 3})),
            "p: (B=2, a=3, b=1)"
        );
    }

    #[test]
    fn key_order_does_not_matter() {
        let a = entry(json!({"version": "1.0.0", "dev": true, "resolved": "x", "peer": true}));
        let b = entry(json!({"peer": true, "resolved": "x", "dev": true, "version": "1.0.0"}));
        assert_eq!(
            canonicalize("node_modules/a", &a).unwrap(),
            canonicalize("node_modules/a", &b).unwrap()
        );
    }

    #[test]
    fn does_not_mutate_entry() {
        let e = entry(json!({"name": "a", "version": "1.0.0"}));
        let before = e.clone();
        let _ = canonicalize("node_modules/a", &e).unwrap();
        assert_eq!(e, before);
    }

    #[test]
    fn false_flag_is_schema_violation() {
        let err = canonicalize("node_modules/a", &entry(json!({"dev": false}))).unwrap_err();
        assert!(err.is_schema_violation());
        match err {
            LockError::SchemaViolation { path, field, .. } => {
                assert_eq!(path, "node_modules/a");
                assert_eq!(field, "dev");
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn null_field_is_schema_violation() {
        let err = canonicalize("node_modules/a", &entry(json!({"peer": null}))).unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[test]
    fn non_string_version_is_schema_violation() {
        let err = canonicalize("node_modules/a", &entry(json!({"version": 1}))).unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err.to_string().contains("a number"));
    }
}
