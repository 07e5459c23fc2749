//! Cross-cycle state accumulated by the reporter
use std::collections::{BTreeMap, BTreeSet};

/// State that lives for the whole run. Never reset.
#[derive(Debug, Default, Clone)]
pub struct CycleState {
    peak_nat_connections: usize,
    remote_to_locals: BTreeMap<String, BTreeSet<String>>,
    total_unique_connections: usize,
    peak_unique_connections: usize,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `local` was seen connected to `remote`.
    /// Returns true the first time the pair is seen.
    pub fn register(&mut self, remote: &str, local: &str) -> bool {
        let locals = self.remote_to_locals.entry(remote.to_string()).or_default();
        let added = locals.insert(local.to_string());
        if added {
            self.total_unique_connections += 1;
        }
        added
    }

    /// Raise the NAT-relevant peak if `count` strictly exceeds it.
    pub fn raise_peak_connections(&mut self, count: usize) -> bool {
        if count > self.peak_nat_connections {
            self.peak_nat_connections = count;
            true
        } else {
            false
        }
    }

    /// Raise the unique-pair peak to the current total if it grew.
    pub fn raise_peak_unique(&mut self) -> bool {
        if self.total_unique_connections > self.peak_unique_connections {
            self.peak_unique_connections = self.total_unique_connections;
            true
        } else {
            false
        }
    }

    pub fn peak_nat_connections(&self) -> usize {
        self.peak_nat_connections
    }

    pub fn total_unique_connections(&self) -> usize {
        self.total_unique_connections
    }

    pub fn peak_unique_connections(&self) -> usize {
        self.peak_unique_connections
    }

    pub fn distinct_remote_count(&self) -> usize {
        self.remote_to_locals.len()
    }

    /// Remotes in ascending order with the number of distinct locals for each.
    pub fn remotes(&self) -> impl Iterator<Item = (&str, usize)> {
        self.remote_to_locals
            .iter()
            .map(|(remote, locals)| (remote.as_str(), locals.len()))
    }
}
