use super::EXIT_SUCCESS;
use clap::{Command, CommandFactory};
use std::path::Path;

pub fn run<C: CommandFactory>(dir: &Path) -> Result<u8, String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("failed to create dir: {e}"))?;
    let cmd = C::command();
    write_page(dir, "lockdiff", cmd.clone())?;
    for sub in cmd.get_subcommands() {
        write_page(dir, &format!("lockdiff-{}", sub.get_name()), sub.clone())?;
    }
    println!("man pages written to {}", dir.display());
    Ok(EXIT_SUCCESS)
}

fn write_page(dir: &Path, name: &str, cmd: Command) -> Result<(), String> {
    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buf)
        .map_err(|e| format!("man page render failed: {e}"))?;
    let path = dir.join(format!("{name}.1"));
    std::fs::write(&path, &buf).map_err(|e| format!("failed to write {}: {e}", path.display()))
}
