use crate::{CoreError, Side};
use lockdiff_schema::{canonicalize, CanonicalRepr, LockDocument, NormalizeOptions};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Name of a hunk in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Meta,
    Packages,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Meta => f.write_str("meta"),
            Section::Packages => f.write_str("packages"),
        }
    }
}

/// One reported difference. Serializes to `{a}`, `{b}` or `{a, b}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Change {
    /// Present on both sides with different canonical forms.
    Modified { a: CanonicalRepr, b: CanonicalRepr },
    /// Only in the old document.
    Removed { a: CanonicalRepr },
    /// Only in the new document.
    Added { b: CanonicalRepr },
}

impl Change {
    /// Old-side rendering, absent for additions.
    pub fn before(&self) -> Option<&CanonicalRepr> {
        match self {
            Change::Modified { a, .. } | Change::Removed { a } => Some(a),
            Change::Added { .. } => None,
        }
    }

    /// New-side rendering, absent for removals.
    pub fn after(&self) -> Option<&CanonicalRepr> {
        match self {
            Change::Modified { b, .. } | Change::Added { b } => Some(b),
            Change::Removed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub section: Section,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub hunks: Vec<Hunk>,
}

impl DiffReport {
    /// Returns `true` if neither a meta nor a packages hunk was produced.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn hunk(&self, section: Section) -> Option<&Hunk> {
        self.hunks.iter().find(|h| h.section == section)
    }

    /// Package entries only in the new document.
    pub fn additions(&self) -> usize {
        self.count_packages(|c| matches!(c, Change::Added { .. }))
    }

    /// Package entries only in the old document.
    pub fn removals(&self) -> usize {
        self.count_packages(|c| matches!(c, Change::Removed { .. }))
    }

    /// Package entries present on both sides that changed.
    pub fn modifications(&self) -> usize {
        self.count_packages(|c| matches!(c, Change::Modified { .. }))
    }

    fn count_packages(&self, pred: impl Fn(&Change) -> bool) -> usize {
        self.hunk(Section::Packages)
            .map_or(0, |h| h.changes.iter().filter(|c| pred(c)).count())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub normalize: NormalizeOptions,
    /// Report the packages hunk even when it holds a single change. Off by
    /// default: a lone change is usually the root project's own version bump.
    pub keep_single_package_change: bool,
}

/// Parse both documents and compare them.
///
/// Either the whole report is produced or an error naming the offending
/// side is returned; there is no partial output.
pub fn diff_lockfiles(old: &str, new: &str, options: &DiffOptions) -> Result<DiffReport, CoreError> {
    let old = LockDocument::from_json_str(old).map_err(CoreError::document(Side::Old))?;
    let new = LockDocument::from_json_str(new).map_err(CoreError::document(Side::New))?;
    diff_documents(old, new, options)
}

/// Compare two freshly parsed documents. Both are normalized here, so
/// callers pass them as parsed.
pub fn diff_documents(
    old: LockDocument,
    new: LockDocument,
    options: &DiffOptions,
) -> Result<DiffReport, CoreError> {
    let old = old.normalize(&options.normalize);
    let new = new.normalize(&options.normalize);

    let mut hunks = Vec::new();

    let meta = meta_changes(&old, &new);
    if !meta.is_empty() {
        hunks.push(Hunk {
            section: Section::Meta,
            changes: meta,
        });
    }

    let packages = package_changes(&old, &new)?;
    debug!(
        "compared {} old / {} new package entries: {} changes",
        old.packages.len(),
        new.packages.len(),
        packages.len()
    );
    if packages.len() > 1 || (options.keep_single_package_change && !packages.is_empty()) {
        hunks.push(Hunk {
            section: Section::Packages,
            changes: packages,
        });
    } else if packages.len() == 1 {
        debug!("suppressing packages hunk with a single change");
    }

    Ok(DiffReport { hunks })
}

fn meta_changes(old: &LockDocument, new: &LockDocument) -> Vec<Change> {
    old.meta_fields()
        .into_iter()
        .zip(new.meta_fields())
        .filter(|((_, a), (_, b))| a != b)
        .map(|((field, a), (_, b))| {
            let (mut a_text, mut b_text) = (render_meta(a), render_meta(b));
            if a_text == b_text {
                // same text, different JSON type: show the encodings
                a_text = render_meta_json(a);
                b_text = render_meta_json(b);
            }
            Change::Modified {
                a: CanonicalRepr::new(format!("{field}: {a_text}")),
                b: CanonicalRepr::new(format!("{field}: {b_text}")),
            }
        })
        .collect()
}

const ABSENT_META: &str = "(none)";

fn render_meta(value: Option<&Value>) -> String {
    match value {
        None => ABSENT_META.to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `ABSENT_META` is not valid JSON, so it never matches an encoded value.
fn render_meta_json(value: Option<&Value>) -> String {
    value.map_or_else(|| ABSENT_META.to_owned(), Value::to_string)
}

fn package_changes(old: &LockDocument, new: &LockDocument) -> Result<Vec<Change>, CoreError> {
    let mut changes = Vec::new();

    for (path, old_entry) in &old.packages {
        let a = canonicalize(path, old_entry).map_err(CoreError::document(Side::Old))?;
        match new.entry(path) {
            None => changes.push(Change::Removed { a }),
            Some(new_entry) => {
                let b = canonicalize(path, new_entry).map_err(CoreError::document(Side::New))?;
                if a != b {
                    changes.push(Change::Modified { a, b });
                }
            }
        }
    }

    for (path, new_entry) in &new.packages {
        if !old.packages.contains_key(path.as_str()) {
            let b = canonicalize(path, new_entry).map_err(CoreError::document(Side::New))?;
            changes.push(Change::Added { b });
        }
    }

    Ok(changes)
}
