use super::{json_pretty, Overrides, EXIT_SUCCESS};
use crate::config::{default_config_path, LockdiffConfig};

/// Print the configuration file contents (with defaults filled in), or
/// write a default file with `init`.
pub fn run(overrides: &Overrides, init: bool, json: bool) -> Result<u8, String> {
    if init {
        let path = overrides
            .config
            .clone()
            .or_else(default_config_path)
            .ok_or_else(|| "config error: cannot determine config path, HOME is unset".to_owned())?;
        if path.exists() {
            return Err(format!("config error: {} already exists", path.display()));
        }
        LockdiffConfig::default().save(&path)?;
        println!("wrote {}", path.display());
        return Ok(EXIT_SUCCESS);
    }

    let config = overrides.load_config()?;
    if json {
        println!("{}", json_pretty(&config)?);
    } else {
        let text = toml::to_string_pretty(&config)
            .map_err(|e| format!("config error: serialization failed: {e}"))?;
        print!("{text}");
    }
    Ok(EXIT_SUCCESS)
}
