//! Trace file readers for the evaluation harnesses.
//!
//! Two formats are supported:
//!
//! - **static** (GET-only): `timestamp item_id item_size` per line,
//!   whitespace-separated;
//! - **dynamic** (mixed): `action timestamp item_id item_size` where the
//!   action is `s` (SET) or `g` (GET).
//!
//! Blank lines are skipped; anything else that fails to parse is a fatal
//! [`CacheError::TraceError`] carrying the 1-based line number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CacheError;

/// One record of a static (GET-only) trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRecord {
    pub timestamp: u64,
    pub item_id: u64,
    pub item_size: u64,
}

/// Request kind in a dynamic trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceAction {
    Set,
    Get,
}

/// One record of a dynamic (mixed SET/GET) trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicRecord {
    pub action: TraceAction,
    pub timestamp: u64,
    pub item_id: u64,
    pub item_size: u64,
}

fn trace_error(line: usize, message: impl Into<String>) -> CacheError {
    CacheError::TraceError {
        line,
        message: message.into(),
    }
}

fn parse_field(token: &str, name: &str, line: usize) -> Result<u64, CacheError> {
    token
        .parse::<u64>()
        .map_err(|_| trace_error(line, format!("invalid {name}: {token}")))
}

/// Load a static trace file.
pub fn load_static_trace(path: &Path) -> Result<Vec<StaticRecord>, CacheError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;

        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };

        let timestamp = parse_field(first, "timestamp", line_no)?;
        let item_id = fields
            .next()
            .ok_or_else(|| trace_error(line_no, "missing item id"))
            .and_then(|t| parse_field(t, "item id", line_no))?;
        let item_size = fields
            .next()
            .ok_or_else(|| trace_error(line_no, "missing item size"))
            .and_then(|t| parse_field(t, "item size", line_no))?;

        records.push(StaticRecord {
            timestamp,
            item_id,
            item_size,
        });
    }

    Ok(records)
}

/// Load a dynamic trace file.
pub fn load_dynamic_trace(path: &Path) -> Result<Vec<DynamicRecord>, CacheError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;

        let mut fields = line.split_whitespace();
        let Some(action) = fields.next() else {
            continue;
        };

        let action = match action {
            "s" => TraceAction::Set,
            "g" => TraceAction::Get,
            other => return Err(trace_error(line_no, format!("invalid action type: {other}"))),
        };

        let timestamp = fields
            .next()
            .ok_or_else(|| trace_error(line_no, "missing timestamp"))
            .and_then(|t| parse_field(t, "timestamp", line_no))?;
        let item_id = fields
            .next()
            .ok_or_else(|| trace_error(line_no, "missing item id"))
            .and_then(|t| parse_field(t, "item id", line_no))?;
        let item_size = fields
            .next()
            .ok_or_else(|| trace_error(line_no, "missing item size"))
            .and_then(|t| parse_field(t, "item size", line_no))?;

        records.push(DynamicRecord {
            action,
            timestamp,
            item_id,
            item_size,
        });
    }

    Ok(records)
}
