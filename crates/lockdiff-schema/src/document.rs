use crate::types::InstallPath;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to read lockfile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lockfile: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("lockfile root must be a JSON object")]
    NotAnObject,
    #[error("lockfile has no 'packages' map (only lockfileVersion 2+ documents are supported)")]
    MissingPackages,
    #[error("package entry '{path}' must be a JSON object")]
    InvalidEntry { path: String },
    #[error("schema violation in package '{path}', field '{field}': {reason}")]
    SchemaViolation {
        path: String,
        field: String,
        reason: String,
    },
}

impl LockError {
    /// True for entries whose shape contradicts the lockfile schema, as
    /// opposed to documents that could not be read or parsed at all.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. })
    }

    pub(crate) fn violation(path: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            path: path.to_owned(),
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

/// One value of the `packages` map. Fields keep their source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageEntry {
    fields: Map<String, Value>,
}

impl PackageEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a copy keeping only the fields accepted by `keep`.
    #[must_use]
    pub fn retain_fields(&self, mut keep: impl FnMut(&str, &Value) -> bool) -> Self {
        let fields = self
            .fields
            .iter()
            .filter(|(k, v)| keep(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { fields }
    }
}

impl<'a> IntoIterator for &'a PackageEntry {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl From<Map<String, Value>> for PackageEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// A parsed lockfile in the flat `packages`-map schema.
///
/// Only the three top-level metadata scalars and the `packages` map take
/// part in a comparison. The legacy nested `dependencies` tree is carried
/// until normalization drops it; every other root field is discarded at
/// parse time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockDocument {
    pub name: Option<Value>,
    pub version: Option<Value>,
    pub lockfile_version: Option<Value>,
    pub packages: IndexMap<InstallPath, PackageEntry>,
    pub legacy_dependencies: Option<Value>,
}

impl LockDocument {
    pub fn from_json_str(input: &str) -> Result<Self, LockError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, LockError> {
        let Value::Object(mut root) = value else {
            return Err(LockError::NotAnObject);
        };

        let Some(Value::Object(raw_packages)) = root.remove("packages") else {
            return Err(LockError::MissingPackages);
        };

        let mut packages = IndexMap::with_capacity(raw_packages.len());
        for (path, entry) in raw_packages {
            let Value::Object(fields) = entry else {
                return Err(LockError::InvalidEntry { path });
            };
            packages.insert(InstallPath::new(path), PackageEntry::new(fields));
        }

        Ok(Self {
            name: root.remove("name"),
            version: root.remove("version"),
            lockfile_version: root.remove("lockfileVersion"),
            packages,
            legacy_dependencies: root.remove("dependencies"),
        })
    }

    /// Top-level metadata fields in their fixed comparison order.
    pub fn meta_fields(&self) -> [(&'static str, Option<&Value>); 3] {
        [
            ("name", self.name.as_ref()),
            ("version", self.version.as_ref()),
            ("lockfileVersion", self.lockfile_version.as_ref()),
        ]
    }

    pub fn entry(&self, path: &str) -> Option<&PackageEntry> {
        self.packages.get(path)
    }
}

pub fn parse_lock_str(input: &str) -> Result<LockDocument, LockError> {
    LockDocument::from_json_str(input)
}

pub fn parse_lock_file(path: impl AsRef<Path>) -> Result<LockDocument, LockError> {
    let content = fs::read_to_string(path)?;
    parse_lock_str(&content)
}
