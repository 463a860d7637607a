use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(long, default_value = "serve")]
    pub mode: Mode,
    /// File with one post url per line (run mode).
    #[arg(long)]
    pub urls: Option<PathBuf>,
    /// File with one giveaway item per line (run mode).
    #[arg(long)]
    pub items: Option<PathBuf>,
    /// Seed for a reproducible draw.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Collect, draw and reveal once, then exit.
    Run,
    /// Serve the HTTP control API.
    Serve,
}

impl Cli {
    /// Input files for run mode; `None` unless both were given.
    pub fn run_inputs(&self) -> Option<(PathBuf, PathBuf)> {
        Some((self.urls.clone()?, self.items.clone()?))
    }
}
