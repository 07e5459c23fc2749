//! Plain text output formatter for the NAT connection watcher
use crate::error::WatchResult;
use crate::formats::traits::OutputFormatter;
use crate::report::Report;
use std::fmt::Write;

/// Tab-separated human-readable blocks, each followed by a blank line
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn format_report(&self, report: &Report) -> WatchResult<String> {
        let mut out = String::new();

        // Writing into a String cannot fail
        match report {
            Report::PeakConnections {
                timestamp,
                count,
                connections,
            } => {
                let _ = writeln!(out, "{}\treached {} connected ports:", timestamp, count);
                for conn in connections {
                    let _ = writeln!(
                        out,
                        "{}\t{}:{}\t{}",
                        conn.state,
                        conn.host,
                        conn.port,
                        conn.program.as_deref().unwrap_or("")
                    );
                }
            }
            Report::PeakUnique {
                timestamp,
                total_connections,
                unique_remotes,
                remotes,
            } => {
                let _ = writeln!(
                    out,
                    "{}\nsaw {} connections with {} unique remote addrs:",
                    timestamp, total_connections, unique_remotes
                );
                for remote in remotes {
                    let _ = writeln!(out, "{}\t{}", remote.remote, remote.locals);
                }
            }
        }
        out.push('\n');

        Ok(out)
    }
}
