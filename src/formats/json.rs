//! JSON output formatter for the NAT connection watcher
use crate::error::WatchResult;
use crate::formats::traits::OutputFormatter;
use crate::report::Report;

/// JSON formatter that outputs each report as a pretty-printed object
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> WatchResult<String> {
        let mut json = serde_json::to_string_pretty(report)?;
        json.push('\n');
        Ok(json)
    }
}
