mod help_text;

use crate::config::{Config, Mode, ResetPolicy};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Snapshot and validate checksums of a file tree
#[derive(Parser, Debug)]
#[command(
    name = "treeseal",
    version,
    about,
    long_about = help_text::ROOT_LONG_ABOUT,
    after_long_help = help_text::ROOT_AFTER_LONG_HELP
)]
pub struct Cli {
    /// Root directory of the tree
    #[arg(short = 'd', long, value_name = "DIR", env = "TREESEAL_DIRECTORY")]
    pub directory: PathBuf,

    /// Operation to perform
    #[arg(short = 'm', long, value_enum, env = "TREESEAL_MODE")]
    pub mode: Mode,

    /// Fail reset if the manifest directory cannot be removed
    #[arg(long)]
    pub strict: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    /// Takes precedence over RUST_LOG.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Set the log level (error, warn, info, debug, trace).
    /// Takes precedence over RUST_LOG.
    #[arg(long, value_name = "LEVEL", conflicts_with = "verbose")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn config(&self) -> Config {
        let reset = if self.strict {
            ResetPolicy::Strict
        } else {
            ResetPolicy::BestEffort
        };
        Config::new(&self.directory, self.mode, reset)
    }
}
