//! CSV output formatter for the NAT connection watcher
use crate::error::WatchResult;
use crate::formats::traits::OutputFormatter;
use crate::report::Report;
use csv::WriterBuilder;

const HEADER: [&str; 6] = ["kind", "timestamp", "state", "endpoint", "program", "count"];

/// CSV formatter with one row per connection or per remote address
pub struct CsvFormatter;

impl OutputFormatter for CsvFormatter {
    fn header(&self) -> WatchResult<Option<String>> {
        let mut wtr = WriterBuilder::new().from_writer(vec![]);
        wtr.write_record(HEADER)?;
        wtr.flush()?;
        let data = wtr.into_inner()?;
        Ok(Some(String::from_utf8(data)?))
    }

    fn format_report(&self, report: &Report) -> WatchResult<String> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(vec![]);
        let kind = report.kind();
        let timestamp = report.timestamp();

        match report {
            Report::PeakConnections {
                count, connections, ..
            } => {
                let count = count.to_string();
                for conn in connections {
                    let endpoint = format!("{}:{}", conn.host, conn.port);
                    wtr.write_record([
                        kind,
                        timestamp,
                        conn.state.as_str(),
                        endpoint.as_str(),
                        conn.program.as_deref().unwrap_or(""),
                        count.as_str(),
                    ])?;
                }
            }
            Report::PeakUnique { remotes, .. } => {
                for remote in remotes {
                    let locals = remote.locals.to_string();
                    wtr.write_record([
                        kind,
                        timestamp,
                        "",
                        remote.remote.as_str(),
                        "",
                        locals.as_str(),
                    ])?;
                }
            }
        }

        wtr.flush()?;
        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}
