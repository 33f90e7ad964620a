//! Command-line argument definitions for the jig CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the package directory, what happens to
//! previously generated files, configuration file selection, and logging
//! verbosity.

use clap::Parser;

use jig::Mode;

/// Command-line arguments for the jig code generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Package directory to generate code for
    #[arg(default_value = ".")]
    pub dir: String,

    /// Remove files generated by jig
    #[arg(short, long)]
    pub clean: bool,

    /// Force regeneration of all code by jig (default)
    #[arg(short, long)]
    pub regen: bool,

    /// Only generate code that is missing
    #[arg(short, long)]
    pub missing: bool,

    /// Print details of what jig is doing
    #[arg(short, long)]
    pub verbose: bool,

    /// No documentation in generated files
    #[arg(short, long)]
    pub nodoc: bool,

    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// The run mode selected by the flags. `--regen` wins over
    /// `--missing`.
    pub fn mode(&self) -> Mode {
        if self.clean {
            Mode::Clean
        } else if self.missing && !self.regen {
            Mode::Missing
        } else {
            Mode::Regenerate
        }
    }
}
