//! Command-line argument definitions for the PDL CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input documents, the output path,
//! configuration file selection and logging verbosity.

use clap::Parser;

/// Command-line arguments for the PDL schema compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// PDL documents compiled together as one library
    #[arg(required = true, help = "Paths to the input documents")]
    pub inputs: Vec<String>,

    /// Path to the generated Rust file; standard output if omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the default parameter tree of every document instead of code
    #[arg(long)]
    pub print_default: bool,
}
