use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::ShellError;

/// What happened to one segment of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentReport {
    Foreground { command: String, pipestatus: Vec<i32> },
    Background { command: String, pid: i32 },
    Failed { command: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    /// The line actually executed (after `!!` expansion).
    pub line: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub segments: Vec<SegmentReport>,
}

impl LineReport {
    /// Status of the line as a whole, taken from its last segment.
    pub fn exit_code(&self) -> i32 {
        match self.segments.last() {
            Some(SegmentReport::Foreground { pipestatus, .. }) => {
                pipestatus.last().copied().unwrap_or(0)
            }
            Some(SegmentReport::Failed { .. }) => 1,
            _ => 0,
        }
    }
}

pub fn write_meta(path: &Path, report: &LineReport) -> Result<(), ShellError> {
    let json = serde_json::to_string(report)?;
    fs::write(path, json)?;
    Ok(())
}
