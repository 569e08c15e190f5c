//! CLI argument parsing for topcsv

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Process-name granularity used when prettification is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NameArg {
    /// Full command line, tokens rejoined with single spaces (default)
    Full,
    /// First command-line token only
    FirstToken,
}

#[derive(Parser, Debug)]
#[command(name = "topcsv")]
#[command(version)]
#[command(
    about = "Convert top logs recorded with `top -b -d 1 -w 512 -i -c` into CSV",
    long_about = None
)]
pub struct Cli {
    /// Recorded top output files to convert
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Output used memory (%MEM) instead of CPU usage (%CPU)
    #[arg(short = 'm', long = "memory")]
    pub memory: bool,

    /// Prettify process names (strip directory prefixes from executables)
    #[arg(short = 'p', long = "prettify")]
    pub prettify: bool,

    /// Process-name granularity (ignored when --prettify is given)
    #[arg(long = "names", value_enum, default_value = "full")]
    pub names: NameArg,

    /// Also write each table to a `<FILE>.csv` sibling next to its input
    #[arg(short = 'o', long = "output-files")]
    pub output_files: bool,

    /// Enable verbose diagnostics on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
