pub mod completions;
pub mod config;
pub mod files;
pub mod git;
pub mod man_pages;

use crate::config::{ColorMode, LockdiffConfig};
use crate::render::{render_report, stylizer};
use lockdiff_core::{diff_lockfiles, CoreError, DiffOptions};
use std::path::{Path, PathBuf};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_LOCKFILE_ERROR: u8 = 2;
pub const EXIT_SCHEMA_VIOLATION: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub registry_hosts: Vec<String>,
    pub keep_single_change: bool,
    pub color: Option<ColorMode>,
}

impl Overrides {
    pub fn load_config(&self) -> Result<LockdiffConfig, String> {
        match &self.config {
            Some(path) => LockdiffConfig::load(path),
            None => LockdiffConfig::load_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiffSettings {
    pub options: DiffOptions,
    pub color: ColorMode,
}

/// Merge flags over the config file over built-in defaults.
pub fn resolve_settings(overrides: &Overrides) -> Result<DiffSettings, String> {
    let config = overrides.load_config()?;
    Ok(merge(&config, overrides))
}

fn merge(config: &LockdiffConfig, overrides: &Overrides) -> DiffSettings {
    let mut options = config.diff_options();
    for host in &overrides.registry_hosts {
        options.normalize = options.normalize.with_registry_host(host);
    }
    if overrides.keep_single_change {
        options.keep_single_package_change = true;
    }
    DiffSettings {
        options,
        color: overrides.color.unwrap_or(config.color),
    }
}

/// Map a diff failure onto the message prefixes `main` turns into exit codes.
pub fn describe_core_error(err: &CoreError) -> String {
    if err.is_schema_violation() {
        format!("schema violation: {err}")
    } else {
        format!("lockfile error: {err}")
    }
}

pub fn read_lockfile(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}

/// Diff two lockfile texts and print the result.
pub fn print_diff(
    old: &str,
    new: &str,
    settings: &DiffSettings,
    json: bool,
) -> Result<u8, String> {
    let report =
        diff_lockfiles(old, new, &settings.options).map_err(|e| describe_core_error(&e))?;

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        let style = stylizer(settings.color.enabled());
        print!("{}", render_report(&report, style.as_ref()));
    }
    Ok(EXIT_SUCCESS)
}
