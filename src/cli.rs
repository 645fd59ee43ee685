// CLI module for argument parsing and configuration

use crate::layout::LayoutMode;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Picsweep - a terminal image triage tool
///
/// Review photos in batches of three, right in the terminal: keep what you
/// love, bin what you don't.
#[derive(Parser, Debug, Clone)]
#[command(name = "picsweep")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directories to search for images (one or more)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Search depth below each root
    ///
    /// 0 scans only files directly inside each root.
    #[arg(short = 'd', long = "depth", default_value_t = 1)]
    pub depth: usize,

    /// Discover images and print the first 10 plus a total count, then exit
    /// without starting an interactive session
    #[arg(long = "test-search", action = ArgAction::SetTrue)]
    pub test_search: bool,

    /// Layout mode for this run (overrides the persisted default)
    #[arg(short = 'm', long = "mode", value_enum)]
    pub mode: Option<ModeArg>,

    /// Review images in a seeded random order instead of discovery order
    #[arg(long = "shuffle", action = ArgAction::SetTrue)]
    pub shuffle: bool,

    /// Seed for --shuffle; the same seed reproduces the same order
    #[arg(long = "seed", default_value_t = 0, requires = "shuffle")]
    pub seed: u64,
}

/// Layout mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One shared scale factor for the whole batch
    Uniform,
    /// An equal slice of the row budget per image
    EqualBudget,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Uniform => LayoutMode::Uniform,
            ModeArg::EqualBudget => LayoutMode::EqualBudget,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        for path in &self.paths {
            if !path.exists() {
                return Err(format!("Path does not exist: {}", path.display()));
            }
            if !path.is_dir() {
                return Err(format!("Path is not a directory: {}", path.display()));
            }
        }
        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: Vec<PathBuf>,
    pub depth: usize,
    pub test_search: bool,
    pub mode: Option<LayoutMode>,
    pub shuffle: bool,
    pub seed: u64,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            paths: args.paths,
            depth: args.depth,
            test_search: args.test_search,
            mode: args.mode.map(Into::into),
            shuffle: args.shuffle,
            seed: args.seed,
        }
    }
}
