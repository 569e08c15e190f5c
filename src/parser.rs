//! Snapshot parsing for batch-mode top logs
//!
//! A recorded log is a repeating sequence of blocks. Each block opens with
//! the column-title line (the one carrying the `PID` token) and is followed
//! by one space-indented data line per process:
//!
//! ```text
//!     PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND
//!  188744 www-data  20   0   93180  38908   7168 S   4.0   0.0   6:03.28 nginx: worker process
//! ```
//!
//! The parser streams the log once, keeping only the current block plus the
//! accumulated results in memory.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use std::path::Path;
use tracing::{debug, warn};

/// Process identifier as reported in the PID column.
pub type Pid = u32;

/// One retained sampling interval: pid to rounded metric value.
pub type Snapshot = HashMap<Pid, i64>;

/// Field layout of a whitespace-split data line.
const PID_FIELD: usize = 0;
const CPU_FIELD: usize = 8;
const MEMORY_FIELD: usize = 9;
/// Command-line tokens start here and run to the end of the line.
const COMMAND_FIELD: usize = 11;

/// Which metric column a conversion extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Percent processor time (%CPU)
    Cpu,
    /// Percent resident memory (%MEM)
    Memory,
}

impl Metric {
    fn field_index(self) -> usize {
        match self {
            Metric::Cpu => CPU_FIELD,
            Metric::Memory => MEMORY_FIELD,
        }
    }
}

/// How a process's displayed name is derived from its command-line tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// Full command line, tokens rejoined with single spaces
    Full,
    /// First command-line token only
    FirstToken,
    /// First token stripped to its filename, remaining arguments appended.
    /// Bracketed kernel-thread names are kept verbatim.
    Pretty,
}

/// Parsed contents of one recorded log.
///
/// Invariant: `order` holds exactly the pids appearing in `snapshots`, each
/// once, in the order they were first observed in a retained snapshot, and
/// every such pid has an entry in `names`.
#[derive(Debug, Default)]
pub struct ParsedLog {
    /// Last-seen display name per pid. A pid reused by the kernel within the
    /// log's timespan merges its owners here, last writer wins.
    pub names: HashMap<Pid, String>,
    /// Retained snapshots in chronological order.
    pub snapshots: Vec<Snapshot>,
    /// Pids in first-observed order across retained snapshots. Keeps row
    /// ordering deterministic where totals tie.
    pub order: Vec<Pid>,
}

/// Streaming parser for batch-mode top output.
#[derive(Debug)]
pub struct SnapshotParser {
    header: Regex,
    metric: Metric,
    name_style: NameStyle,
}

impl SnapshotParser {
    /// Create a parser extracting the given metric column.
    pub fn new(metric: Metric, name_style: NameStyle) -> Self {
        Self {
            header: Regex::new(r"^\s*PID\s").expect("header pattern is valid"),
            metric,
            name_style,
        }
    }

    /// Parse a full line stream into the name lookup and retained snapshots.
    ///
    /// The first completed block is always dropped: top needs one interval of
    /// warm-up before its rates are meaningful. Completed blocks with no data
    /// lines are dropped as well, so monitoring gaps never surface as
    /// all-zero columns (interval numbering compresses across gaps). The
    /// trailing block, still open at end of input, is kept when non-empty.
    ///
    /// Malformed data lines (missing fields, unparsable pid or metric) are
    /// skipped with a warning rather than failing the whole file.
    pub fn parse<R: BufRead>(&self, reader: R) -> io::Result<ParsedLog> {
        let mut log = ParsedLog::default();
        let mut seen = HashSet::new();
        let mut current = Snapshot::new();
        let mut current_order: Vec<Pid> = Vec::new();
        let mut interval: i64 = -1;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if self.header.is_match(&line) {
                interval += 1;
                if interval > 1 && !current.is_empty() {
                    retain(&mut log, &mut seen, &mut current, &mut current_order);
                } else {
                    if interval == 1 && !current.is_empty() {
                        debug!(entries = current.len(), "dropping warm-up snapshot");
                    }
                    current.clear();
                    current_order.clear();
                }
                continue;
            }
            if line.starts_with(' ') {
                match self.parse_data_line(&line) {
                    Some((pid, value, name)) => {
                        log.names.insert(pid, name);
                        if current.insert(pid, value).is_none() {
                            current_order.push(pid);
                        }
                    }
                    None => warn!(line = index + 1, "skipping malformed data line"),
                }
            }
        }

        // The last block has no closing header.
        if !current.is_empty() {
            retain(&mut log, &mut seen, &mut current, &mut current_order);
        }

        debug!(
            processes = log.names.len(),
            snapshots = log.snapshots.len(),
            "parsed log"
        );
        Ok(log)
    }

    /// Extract (pid, rounded metric value, display name) from one data line.
    ///
    /// Sub-unit metric precision is not needed downstream, so the raw
    /// floating-point field is rounded to the nearest whole unit here.
    fn parse_data_line(&self, line: &str) -> Option<(Pid, i64, String)> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let pid: Pid = fields.get(PID_FIELD)?.parse().ok()?;
        let value: f64 = fields.get(self.metric.field_index())?.parse().ok()?;
        let command = fields.get(COMMAND_FIELD..).filter(|c| !c.is_empty())?;
        Some((pid, value.round() as i64, self.resolve_name(command)))
    }

    fn resolve_name(&self, command: &[&str]) -> String {
        match self.name_style {
            NameStyle::Full => command.join(" "),
            NameStyle::FirstToken => command[0].to_string(),
            NameStyle::Pretty => prettify_name(command),
        }
    }
}

/// Move a completed block into the retained sequence, folding its pids into
/// the global discovery order.
fn retain(
    log: &mut ParsedLog,
    seen: &mut HashSet<Pid>,
    current: &mut Snapshot,
    current_order: &mut Vec<Pid>,
) {
    for pid in current_order.drain(..) {
        if seen.insert(pid) {
            log.order.push(pid);
        }
    }
    log.snapshots.push(std::mem::take(current));
}

/// Strip the directory prefix from the executable token and re-append the
/// argument list. Kernel threads report bracketed names like `[kworker/0:1]`
/// rather than paths and are never stripped.
fn prettify_name(command: &[&str]) -> String {
    let first = command[0];
    let mut name = if first.starts_with('[') {
        first.to_string()
    } else {
        Path::new(first)
            .file_name()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| first.to_string())
    };
    for arg in &command[1..] {
        name.push(' ');
        name.push_str(arg);
    }
    name
}
