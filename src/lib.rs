//! Topcsv - batch-mode top log to CSV time-series converter
//!
//! This library provides the core functionality for turning logs recorded
//! with `top -b -d 1 -w 512 -i -c` into a per-process time series: one row
//! per observed process, one column per sampling interval, cell value equal
//! to the rounded %CPU (or %MEM) at that interval.

pub mod cli;
pub mod convert;
pub mod parser;
pub mod series;
