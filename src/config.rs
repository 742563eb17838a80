use clap::ValueEnum;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Record a checksum for every file in the tree
    Init,
    /// Check every recorded file against its checksum
    Validate,
    /// Delete the manifest so the tree can be initialized again
    Reset,
}

/// How Reset reacts to removal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Log removal errors and report success.
    #[default]
    BestEffort,
    /// Fail if the manifest directory could not be removed.
    Strict,
}

/// Everything a single run needs, resolved once by the entry point.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub mode: Mode,
    pub reset: ResetPolicy,
}

impl Config {
    pub fn new(root: &Path, mode: Mode, reset: ResetPolicy) -> Self {
        Config {
            root: root.components().collect(),
            mode,
            reset,
        }
    }
}
