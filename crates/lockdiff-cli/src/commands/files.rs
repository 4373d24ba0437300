use super::{print_diff, read_lockfile, resolve_settings, Overrides};
use std::path::Path;

pub fn run(old: &Path, new: &Path, overrides: &Overrides, json: bool) -> Result<u8, String> {
    let settings = resolve_settings(overrides)?;
    let old_text = read_lockfile(old)?;
    let new_text = read_lockfile(new)?;
    print_diff(&old_text, &new_text, &settings, json)
}
