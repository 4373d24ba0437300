use crate::document::{LockDocument, PackageEntry};
use serde_json::Value;
use tracing::trace;
use url::Url;

/// Host of the public npm registry. `resolved` URLs pointing here carry no
/// information beyond name and version.
pub const DEFAULT_REGISTRY_HOST: &str = "registry.npmjs.org";

/// Package entry fields dropped before comparison: either irrelevant to
/// what gets installed, or rewritten by routine regeneration.
pub const NOISE_FIELDS: &[&str] = &[
    "license",
    "engines",
    "workspaces",
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "peerDependenciesMeta",
    "optionalDependencies",
    "deprecated",
    "cpu",
    "os",
    "funding",
    "bin",
    "hasInstallScript",
    "integrity",
];

const RESOLVED_FIELD: &str = "resolved";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Hostnames treated as the default registry when deciding whether a
    /// `resolved` URL is noise.
    pub registry_hosts: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            registry_hosts: vec![DEFAULT_REGISTRY_HOST.to_owned()],
        }
    }
}

impl NormalizeOptions {
    #[must_use]
    pub fn with_registry_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        if !self.registry_hosts.contains(&host) {
            self.registry_hosts.push(host);
        }
        self
    }
}

impl LockDocument {
    /// Strip the legacy dependency tree and every noise field from the
    /// package entries.
    ///
    /// Consumes the document: the pre-normalization form is not meant to be
    /// compared against anything. Running it again on its own output is a
    /// no-op.
    #[must_use]
    pub fn normalize(self, options: &NormalizeOptions) -> LockDocument {
        let packages = self
            .packages
            .into_iter()
            .map(|(path, entry)| {
                let entry = normalize_entry(&entry, options);
                (path, entry)
            })
            .collect();

        LockDocument {
            name: self.name,
            version: self.version,
            lockfile_version: self.lockfile_version,
            packages,
            legacy_dependencies: None,
        }
    }
}

fn normalize_entry(entry: &PackageEntry, options: &NormalizeOptions) -> PackageEntry {
    entry.retain_fields(|field, value| {
        if NOISE_FIELDS.contains(&field) {
            return false;
        }
        if field == RESOLVED_FIELD {
            if let Value::String(resolved) = value {
                return !is_default_registry_url(resolved, &options.registry_hosts);
            }
        }
        true
    })
}

/// Whether `resolved` is a URL served by one of `registry_hosts`.
///
/// Anything that does not parse as a URL (tarball paths, `file:` specs
/// without a scheme, garbage) is reported as `false` so the field is kept.
pub fn is_default_registry_url(resolved: &str, registry_hosts: &[String]) -> bool {
    match Url::parse(resolved) {
        Ok(url) => {
            let matched = url
                .host_str()
                .is_some_and(|host| registry_hosts.iter().any(|h| h == host));
            if matched {
                trace!("dropping default registry URL {resolved}");
            }
            matched
        }
        Err(e) => {
            trace!("keeping unparsable resolved value '{resolved}': {e}");
            false
        }
    }
}
