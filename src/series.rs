//! Series assembly and CSV rendering
//!
//! Turns a parsed log into the final table: one row per process, one column
//! per retained snapshot, rows ordered by descending total usage.

use crate::parser::{ParsedLog, Pid, Snapshot};
use std::collections::HashMap;

/// Sum each pid's values across every retained snapshot. Absence from a
/// snapshot contributes nothing; pids seen only in the warm-up block never
/// show up here and therefore never get a row.
fn total_usage(snapshots: &[Snapshot]) -> HashMap<Pid, i64> {
    let mut totals = HashMap::new();
    for snapshot in snapshots {
        for (&pid, &value) in snapshot {
            *totals.entry(pid).or_insert(0) += value;
        }
    }
    totals
}

/// (pid, name) pairs ordered by descending total usage.
///
/// No secondary key: the sort is stable over the log's discovery order, so
/// tied totals come out in the order the pids first appeared, the same on
/// every run of the same input.
pub fn rank_by_total_usage(log: &ParsedLog) -> Vec<(Pid, String)> {
    let totals = total_usage(&log.snapshots);
    let mut ranked: Vec<(Pid, i64)> = log.order.iter().map(|&pid| (pid, totals[&pid])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .map(|(pid, _)| (pid, log.names[&pid].clone()))
        .collect()
}

/// CSV renderer for an assembled series.
#[derive(Debug)]
pub struct SeriesTable<'a> {
    log: &'a ParsedLog,
    rows: Vec<(Pid, String)>,
}

impl<'a> SeriesTable<'a> {
    /// Assemble the table: totals first, then the descending row order.
    pub fn assemble(log: &'a ParsedLog) -> Self {
        Self {
            log,
            rows: rank_by_total_usage(log),
        }
    }

    /// Render the delimiter-separated table.
    ///
    /// The header row labels columns with 1-based interval numbers. A process
    /// absent from a snapshot gets the zero-filler token in that column,
    /// never a blank field. Every row, the last included, ends in a newline.
    pub fn to_csv(&self, delimiter: char, zero_filler: &str) -> String {
        let mut output = String::from("command");
        for interval in 1..=self.log.snapshots.len() {
            output.push(delimiter);
            output.push_str(&interval.to_string());
        }
        output.push('\n');

        for (pid, name) in &self.rows {
            output.push_str(name);
            for snapshot in &self.log.snapshots {
                output.push(delimiter);
                match snapshot.get(pid) {
                    Some(value) => output.push_str(&value.to_string()),
                    None => output.push_str(zero_filler),
                }
            }
            output.push('\n');
        }
        output
    }
}
