//! Table output formatter for the NAT connection watcher
use crate::error::WatchResult;
use crate::formats::traits::OutputFormatter;
use crate::report::Report;
use prettytable::{Cell, Row, Table};

/// Table formatter that renders each report as a titled table
pub struct TableFormatter;

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &Report) -> WatchResult<String> {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        let title = match report {
            Report::PeakConnections {
                timestamp,
                count,
                connections,
            } => {
                table.set_titles(Row::new(vec![
                    Cell::new("STATE").style_spec("c"),
                    Cell::new("HOST").style_spec("c"),
                    Cell::new("PORT").style_spec("c"),
                    Cell::new("PROGRAM").style_spec("c"),
                ]));
                for conn in connections {
                    table.add_row(Row::new(vec![
                        Cell::new(&conn.state),
                        Cell::new(&conn.host),
                        Cell::new(&conn.port),
                        Cell::new(conn.program.as_deref().unwrap_or("")),
                    ]));
                }
                format!("{} reached {} connected ports", timestamp, count)
            }
            Report::PeakUnique {
                timestamp,
                total_connections,
                unique_remotes,
                remotes,
            } => {
                table.set_titles(Row::new(vec![
                    Cell::new("REMOTE").style_spec("c"),
                    Cell::new("LOCALS").style_spec("c"),
                ]));
                for remote in remotes {
                    table.add_row(Row::new(vec![
                        Cell::new(&remote.remote),
                        Cell::new(&remote.locals.to_string()).style_spec("r"),
                    ]));
                }
                format!(
                    "{} saw {} connections with {} unique remote addrs",
                    timestamp, total_connections, unique_remotes
                )
            }
        };

        Ok(format!("{}\n{}\n", title, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample;
    use crate::report::Reporter;

    #[test]
    fn test_table_contains_rows() {
        let mut reporter = Reporter::new(true);
        let reports = reporter.observe(&sample(&[("93.184.216.34:443", "10.0.0.2:40000")]));

        let table = TableFormatter.format_report(&reports[0]).unwrap();
        assert!(table.contains("reached 1 connected ports"));
        assert!(table.contains("93.184.216.34"));
        assert!(table.contains("PROGRAM"));

        let table = TableFormatter.format_report(&reports[1]).unwrap();
        assert!(table.contains("93.184.216.34:443"));
        assert!(table.contains("LOCALS"));
    }
}
