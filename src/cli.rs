// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Incremental asset pipeline: build, watch and serve a front-end source tree.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory. A missing
    /// file means the conventional defaults apply.
    #[arg(long, value_name = "PATH", default_value = "Assetpipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build all assets once and exit; non-zero if any task failed.
    Build {
        /// Run only the named tasks (markup, styles, scripts, fonts, icons,
        /// images). May be given multiple times; default is all of them.
        #[arg(long, value_name = "TASK")]
        only: Vec<String>,
    },

    /// Build everything, then watch the source tree and serve the output
    /// with live reload. Runs until terminated.
    Watch,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
