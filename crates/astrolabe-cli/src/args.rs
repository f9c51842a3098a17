//! Command-line argument definitions for the Astrolabe CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select between laying out a single graph file
//! and serving the message protocol over stdin/stdout.

use clap::Parser;

/// Command-line arguments for the Astrolabe layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input graph document (JSON)
    #[arg(
        help = "Path to the input graph document",
        required_unless_present = "serve"
    )]
    pub input: Option<String>,

    /// Path to write the resulting event to; stdout if omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Speak the JSON-lines protocol on stdin/stdout instead of reading a file
    #[arg(long, conflicts_with_all = ["input", "output", "fallback"])]
    pub serve: bool,

    /// Skip the simulation and write a static grid layout
    #[arg(long)]
    pub fallback: bool,
}
