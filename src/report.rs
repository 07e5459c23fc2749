//! Change-triggered reporting over accumulated cycle state
use crate::socket::{ConnectionRecord, Sample};
use crate::state::CycleState;
use chrono::{Local, SecondsFormat};
use log::debug;
use serde::Serialize;

/// Number of distinct local addresses seen for one remote address.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RemoteSummary {
    pub remote: String,
    pub locals: usize,
}

/// A report emitted when a tracked metric reaches a new peak.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    /// More NAT-relevant connections in one cycle than ever before
    PeakConnections {
        timestamp: String,
        count: usize,
        connections: Vec<ConnectionRecord>,
    },
    /// More distinct (remote, local) pairs than ever before
    PeakUnique {
        timestamp: String,
        total_connections: usize,
        unique_remotes: usize,
        remotes: Vec<RemoteSummary>,
    },
}

impl Report {
    pub fn timestamp(&self) -> &str {
        match self {
            Report::PeakConnections { timestamp, .. } | Report::PeakUnique { timestamp, .. } => {
                timestamp
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Report::PeakConnections { .. } => "peak_connections",
            Report::PeakUnique { .. } => "peak_unique",
        }
    }
}

/// RFC 3339 timestamp of the current local time.
pub fn now_rfc3339() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub struct Reporter {
    state: CycleState,
    track_unique: bool,
}

impl Reporter {
    pub fn new(track_unique: bool) -> Self {
        Self {
            state: CycleState::new(),
            track_unique,
        }
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// Fold one completed cycle into the state and return the reports it
    /// triggers. The two checks are independent and both run every cycle.
    pub fn observe(&mut self, sample: &Sample) -> Vec<Report> {
        let mut reports = Vec::new();

        let count = sample.records.len();
        if self.state.raise_peak_connections(count) {
            reports.push(Report::PeakConnections {
                timestamp: now_rfc3339(),
                count,
                connections: sample.records.clone(),
            });
        }

        if self.track_unique {
            let added = sample
                .records
                .iter()
                .filter(|r| self.state.register(&r.remote_addr, &r.local_addr))
                .count();
            debug!(
                "{} new connection pairs, {} total",
                added,
                self.state.total_unique_connections()
            );

            if self.state.raise_peak_unique() {
                reports.push(Report::PeakUnique {
                    timestamp: now_rfc3339(),
                    total_connections: self.state.total_unique_connections(),
                    unique_remotes: self.state.distinct_remote_count(),
                    remotes: self
                        .state
                        .remotes()
                        .map(|(remote, locals)| RemoteSummary {
                            remote: remote.to_string(),
                            locals,
                        })
                        .collect(),
                });
            }
        }

        reports
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(remote: &str, local: &str) -> ConnectionRecord {
        let (host, port) = remote.rsplit_once(':').unwrap();
        ConnectionRecord {
            state: "ESTAB".to_string(),
            host: host.to_string(),
            port: port.to_string(),
            program: Some("users:((\"curl\",pid=1,fd=3))".to_string()),
            local_addr: local.to_string(),
            remote_addr: remote.to_string(),
        }
    }

    pub(crate) fn sample(pairs: &[(&str, &str)]) -> Sample {
        Sample {
            records: pairs.iter().map(|(r, l)| record(r, l)).collect(),
            filtered: 0,
        }
    }

    #[test]
    fn test_three_cycle_scenario() {
        let mut reporter = Reporter::new(true);

        let first = sample(&[
            ("1.1.1.1:443", "10.0.0.2:40000"),
            ("2.2.2.2:443", "10.0.0.2:40001"),
            ("3.3.3.3:443", "10.0.0.2:40002"),
        ]);
        let reports = reporter.observe(&first);
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0], Report::PeakConnections { count: 3, .. }));
        assert!(matches!(
            reports[1],
            Report::PeakUnique { total_connections: 3, unique_remotes: 3, .. }
        ));

        let second = sample(&[
            ("4.4.4.4:443", "10.0.0.2:40003"),
            ("5.5.5.5:443", "10.0.0.2:40004"),
        ]);
        let reports = reporter.observe(&second);
        assert_eq!(reports.len(), 1);
        assert!(matches!(
            reports[0],
            Report::PeakUnique { total_connections: 5, unique_remotes: 5, .. }
        ));
        assert_eq!(reporter.state().peak_nat_connections(), 3);

        let reports = reporter.observe(&first);
        assert!(reports.is_empty());
        assert_eq!(reporter.state().total_unique_connections(), 5);
    }

    #[test]
    fn test_peak_report_lists_cycle_records_in_order() {
        let mut reporter = Reporter::new(false);
        let cycle = sample(&[("9.9.9.9:53", "a:1"), ("1.1.1.1:53", "a:2")]);
        let reports = reporter.observe(&cycle);
        assert_eq!(reports.len(), 1);
        match &reports[0] {
            Report::PeakConnections { connections, .. } => {
                assert_eq!(connections, &cycle.records);
            }
            other => panic!("unexpected report: {:?}", other),
        }
        assert_eq!(reporter.state().total_unique_connections(), 0);
    }

    #[test]
    fn test_unique_report_sorted_without_duplicates() {
        let mut reporter = Reporter::new(true);
        let reports = reporter.observe(&sample(&[
            ("9.9.9.9:53", "a:1"),
            ("1.1.1.1:53", "a:2"),
            ("9.9.9.9:53", "a:3"),
            ("1.1.1.1:53", "a:2"),
        ]));
        match &reports[1] {
            Report::PeakUnique {
                total_connections,
                remotes,
                ..
            } => {
                assert_eq!(*total_connections, 3);
                let names: Vec<_> = remotes.iter().map(|r| r.remote.as_str()).collect();
                assert_eq!(names, vec!["1.1.1.1:53", "9.9.9.9:53"]);
                assert_eq!(remotes[0].locals, 1);
                assert_eq!(remotes[1].locals, 2);
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[test]
    fn test_empty_cycles_never_report() {
        let mut reporter = Reporter::new(true);
        assert!(reporter.observe(&Sample::default()).is_empty());
        assert!(reporter.observe(&Sample::default()).is_empty());
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = now_rfc3339();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
