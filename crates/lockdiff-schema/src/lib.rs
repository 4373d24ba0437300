//! Lockfile document model, normalization and canonical entry rendering for lockdiff.
//!
//! This crate defines the schema layer: parsing of the flat `packages`-map
//! lockfile format (`LockDocument`), removal of fields that only add noise
//! to a comparison (`LockDocument::normalize`), and the deterministic
//! single-line form of one package entry (`canonicalize`) that the diff
//! engine compares.

pub mod canonical;
pub mod document;
pub mod normalize;
pub mod types;

pub use canonical::canonicalize;
pub use document::{parse_lock_file, parse_lock_str, LockDocument, LockError, PackageEntry};
pub use normalize::{
    is_default_registry_url, NormalizeOptions, DEFAULT_REGISTRY_HOST, NOISE_FIELDS,
};
pub use types::{CanonicalRepr, InstallPath};
