use super::{print_diff, read_lockfile, resolve_settings, Overrides};
use crate::vcs::show_file_at_revision;
use std::path::Path;
use std::time::Duration;

/// Compare `file` at `rev` (old side) against the working tree (new side).
pub fn run(
    rev: &str,
    file: &Path,
    timeout_secs: u64,
    overrides: &Overrides,
    json: bool,
) -> Result<u8, String> {
    let settings = resolve_settings(overrides)?;
    let old_text = show_file_at_revision(rev, file, Duration::from_secs(timeout_secs))?;
    let new_text = read_lockfile(file)?;
    print_diff(&old_text, &new_text, &settings, json)
}
