//! Per-file conversion driver
//!
//! Wires the snapshot parser and the series renderer together behind one
//! explicit configuration structure, and owns the output plumbing: standard
//! output always, plus an optional sibling file next to the input.

use crate::parser::{Metric, NameStyle, SnapshotParser};
use crate::series::SeriesTable;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Suffix appended to an input file's name for the sibling output file.
const OUTPUT_SUFFIX: &str = ".csv";

/// Where a converted table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output only (default)
    Stdout,
    /// Standard output plus a sibling file next to the input
    StdoutAndFile,
}

/// Errors that can fail a single file's conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to write standard output: {0}")]
    Stdout(io::Error),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Explicit knobs for one conversion run.
///
/// One structure covers what used to be separate tool variants: metric
/// selection, name granularity, and output destination, along with the
/// delimiter and zero-filler tokens the renderer uses.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub metric: Metric,
    pub name_style: NameStyle,
    pub output: OutputTarget,
    pub delimiter: char,
    pub zero_filler: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Cpu,
            name_style: NameStyle::Full,
            output: OutputTarget::Stdout,
            delimiter: ',',
            zero_filler: "0".to_string(),
        }
    }
}

/// Convert one recorded log stream into its rendered table.
pub fn convert_reader<R: BufRead>(reader: R, config: &ConvertConfig) -> io::Result<String> {
    let parser = SnapshotParser::new(config.metric, config.name_style);
    let log = parser.parse(reader)?;
    Ok(SeriesTable::assemble(&log).to_csv(config.delimiter, &config.zero_filler))
}

/// Convert one input file and write the table per the configured target.
///
/// The table is rendered fully in memory before anything is written, so a
/// parse failure never leaves a partial output file behind. The sibling file
/// is written before the stdout echo.
pub fn convert_file(path: &Path, config: &ConvertConfig) -> Result<()> {
    let file = File::open(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let csv = convert_reader(BufReader::new(file), config).map_err(|source| {
        ConvertError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if config.output == OutputTarget::StdoutAndFile {
        let sibling = sibling_path(path);
        debug!(path = %sibling.display(), "writing sibling output file");
        fs::write(&sibling, &csv).map_err(|source| ConvertError::Write {
            path: sibling,
            source,
        })?;
    }

    io::stdout()
        .lock()
        .write_all(csv.as_bytes())
        .map_err(ConvertError::Stdout)
}

/// Sibling output path: the input file name with the fixed suffix appended.
fn sibling_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(OUTPUT_SUFFIX);
    PathBuf::from(name)
}
