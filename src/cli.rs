//! Command-line surface, parsed with `clap`'s derive API the way the
//! rest of this pack's tools do.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(name = "xmk", about = "A small, declarative, incremental build tool")]
pub struct Cli {
    /// Preprocess only: expand macros and print the source, then exit.
    #[arg(short = 'E')]
    pub preprocess_only: bool,

    /// Verbose logging. Repeat (`-vv`) for extra-verbose; `-vv` implies
    /// `-v`.
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Input file.
    #[arg(short = 'f', default_value = "default.xmk")]
    pub file: PathBuf,

    /// Suppress echoing of commands before execution.
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::ExtraVerbose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Verbose,
    ExtraVerbose,
}

impl Verbosity {
    pub fn tracing_filter(self) -> &'static str {
        match self {
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::ExtraVerbose => "debug",
        }
    }

    /// Whether `-v`/`-vv` was given. Mirrors the original's `verbose()`
    /// check, which gates `LOGV(...)` lines independently of `-q`.
    pub fn is_verbose(self) -> bool {
        self != Verbosity::Normal
    }
}
