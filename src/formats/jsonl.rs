//! JSONL (JSON Lines) output formatter for the NAT connection watcher
use crate::error::WatchResult;
use crate::formats::traits::OutputFormatter;
use crate::report::Report;

/// JSONL formatter that outputs each report as one JSON object per line
pub struct JsonlFormatter;

impl OutputFormatter for JsonlFormatter {
    fn format_report(&self, report: &Report) -> WatchResult<String> {
        let mut line = serde_json::to_string(report)?;
        line.push('\n');
        Ok(line)
    }
}
