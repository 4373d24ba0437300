mod commands;
mod config;
mod render;
mod vcs;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{Overrides, EXIT_FAILURE, EXIT_LOCKFILE_ERROR, EXIT_SCHEMA_VIOLATION};
use config::ColorMode;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    name = "lockdiff",
    version,
    about = "Semantic diff for npm package-lock.json files"
)]
struct Cli {
    /// Path to the lockdiff config file (default: $LOCKDIFF_CONFIG or ~/.config/lockdiff/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    /// When to color human-readable output.
    #[arg(long, value_enum, global = true)]
    color: Option<ColorMode>,

    /// Extra registry host whose tarball URLs are treated as noise. Repeatable.
    #[arg(long = "registry-host", value_name = "HOST", global = true)]
    registry_hosts: Vec<String>,

    /// Report the packages hunk even when it holds a single change.
    #[arg(long, default_value_t = false, global = true)]
    keep_single_change: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two lockfiles on disk.
    Files {
        /// Lockfile before the change.
        old: PathBuf,
        /// Lockfile after the change.
        new: PathBuf,
    },
    /// Compare a lockfile at a git revision against the working tree.
    Git {
        /// Revision holding the old side.
        #[arg(default_value = "HEAD")]
        rev: String,
        /// Lockfile path in the working tree.
        #[arg(long, default_value = "package-lock.json")]
        file: PathBuf,
        /// Kill `git show` if it runs longer than this (at least 1).
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: u64,
    },
    /// Show the config file, or create a default one.
    Config {
        /// Write a default config file instead of printing.
        #[arg(long, default_value_t = false)]
        init: bool,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LOCKDIFF_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;
    let overrides = Overrides {
        config: cli.config,
        registry_hosts: cli.registry_hosts,
        keep_single_change: cli.keep_single_change,
        color: cli.color,
    };

    let result = match cli.command {
        Commands::Files { old, new } => commands::files::run(&old, &new, &overrides, json_output),
        Commands::Git {
            rev,
            file,
            timeout_secs,
        } => commands::git::run(&rev, &file, timeout_secs, &overrides, json_output),
        Commands::Config { init } => commands::config::run(&overrides, init, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("lockfile error:") {
                EXIT_LOCKFILE_ERROR
            } else if msg.starts_with("schema violation:") {
                EXIT_SCHEMA_VIOLATION
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn git_timeout_must_be_positive() {
        assert!(Cli::try_parse_from(["lockdiff", "git", "--timeout-secs", "0"]).is_err());

        let cli = Cli::try_parse_from(["lockdiff", "git", "--timeout-secs", "1"]).unwrap();
        assert!(matches!(cli.command, Commands::Git { timeout_secs: 1, .. }));
    }

    #[test]
    fn git_defaults() {
        let cli = Cli::try_parse_from(["lockdiff", "git"]).unwrap();
        let Commands::Git {
            rev,
            file,
            timeout_secs,
        } = cli.command
        else {
            panic!("expected the git subcommand");
        };
        assert_eq!(rev, "HEAD");
        assert_eq!(file, PathBuf::from("package-lock.json"));
        assert_eq!(timeout_secs, 10);
    }
}
