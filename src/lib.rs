//! Library crate for the NAT connection watcher
//!
//! Samples the socket table with `ss`, drops connections to known-benign
//! endpoints, and reports whenever the number of NAT-relevant connections or
//! the number of distinct (remote, local) address pairs reaches a new peak.

pub mod classify;
pub mod error;
pub mod report;
pub mod socket;
pub mod state;
pub mod watch;

// CLI modules
pub mod cli {
    pub mod args;
}

// Format modules
pub mod formats {
    pub mod csv;
    pub mod json;
    pub mod jsonl;
    pub mod table;
    pub mod text;
    pub mod traits;
}
