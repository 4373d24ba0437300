use lockdiff_core::DiffOptions;
use lockdiff_schema::{NormalizeOptions, DEFAULT_REGISTRY_HOST};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LOCKDIFF_CONFIG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve `auto` against the terminal (and `NO_COLOR` / `CLICOLOR*`).
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Auto => console::colors_enabled(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockdiffConfig {
    pub registry_hosts: Vec<String>,
    pub keep_single_package_change: bool,
    pub color: ColorMode,
}

impl Default for LockdiffConfig {
    fn default() -> Self {
        Self {
            registry_hosts: vec![DEFAULT_REGISTRY_HOST.to_owned()],
            keep_single_package_change: false,
            color: ColorMode::Auto,
        }
    }
}

impl LockdiffConfig {
    /// Load from `$LOCKDIFF_CONFIG` or `~/.config/lockdiff/config.toml`.
    /// A missing file is not an error.
    pub fn load_default() -> Result<Self, String> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("config error: failed to read {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| format!("config error: invalid {}: {e}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("config error: failed to create {}: {e}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("config error: serialization failed: {e}"))?;
        std::fs::write(path, content)
            .map_err(|e| format!("config error: failed to write {}: {e}", path.display()))
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            normalize: NormalizeOptions {
                registry_hosts: self.registry_hosts.clone(),
            },
            keep_single_package_change: self.keep_single_package_change,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/lockdiff/config.toml"))
}
