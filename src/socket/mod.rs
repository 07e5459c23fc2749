//! Socket table sampling: connection records and line parsing
use crate::error::{WatchError, WatchResult};
use serde::Serialize;

pub mod ss;

pub use ss::SsSampler;

/// One NAT-relevant connection parsed from a line of socket-table output.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub state: String,
    pub host: String,
    pub port: String,
    pub program: Option<String>,
    pub local_addr: String,  // Raw local addr:port, used as a dedup key
    pub remote_addr: String, // Raw remote addr:port, used as a dedup key
}

/// Result of one sampling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    /// NAT-relevant records in the order the facility printed them
    pub records: Vec<ConnectionRecord>,
    /// Number of benign records dropped during classification
    pub filtered: usize,
}

/// A source of socket-table samples, one per cycle.
pub trait SocketSource {
    fn sample(&mut self) -> WatchResult<Sample>;
}

/// Minimum number of whitespace-separated fields on a socket-table line.
pub const MIN_FIELDS: usize = 6;

const STATE_FIELD: usize = 1;
const LOCAL_FIELD: usize = 4;
const REMOTE_FIELD: usize = 5;
const PROGRAM_FIELD: usize = 6;

/// Parse one line of `ss --oneline` output into a record.
///
/// `command` describes the invocation and is only used in error messages.
pub fn parse_line(command: &str, line: &str) -> WatchResult<ConnectionRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(WatchError::MalformedLine {
            command: command.to_string(),
            line: line.to_string(),
        });
    }

    let remote_addr = fields[REMOTE_FIELD];
    let (host, port) = split_host_port(remote_addr).map_err(|_| WatchError::BadRemoteAddr {
        command: command.to_string(),
        addr: remote_addr.to_string(),
    })?;

    Ok(ConnectionRecord {
        state: fields[STATE_FIELD].to_string(),
        host: host.to_string(),
        port: port.to_string(),
        program: fields.get(PROGRAM_FIELD).map(|p| p.to_string()),
        local_addr: fields[LOCAL_FIELD].to_string(),
        remote_addr: remote_addr.to_string(),
    })
}

/// Split `host:port` or `[host]:port` on the rightmost colon.
///
/// An unbracketed host may not contain a colon, so raw IPv6 literals are
/// rejected rather than split at an arbitrary position.
pub fn split_host_port(addr: &str) -> WatchResult<(&str, &str)> {
    let err = |reason| WatchError::AddrParse {
        addr: addr.to_string(),
        reason,
    };

    let colon = addr.rfind(':').ok_or_else(|| err("missing port in address"))?;

    let host = if let Some(rest) = addr.strip_prefix('[') {
        let end = rest.find(']').ok_or_else(|| err("missing ']' in address"))? + 1;
        match end + 1 {
            after if after == addr.len() => return Err(err("missing port in address")),
            after if after == colon => {}
            after if addr.as_bytes()[after] == b':' => return Err(err("too many colons in address")),
            _ => return Err(err("missing port in address")),
        }
        if addr[end + 1..].contains(']') {
            return Err(err("unexpected ']' in address"));
        }
        &addr[1..end]
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return Err(err("too many colons in address"));
        }
        if addr.contains(']') {
            return Err(err("unexpected ']' in address"));
        }
        host
    };

    if host.contains('[') || addr[colon..].contains('[') {
        return Err(err("unexpected '[' in address"));
    }

    let port = &addr[colon + 1..];
    if host.is_empty() || port.is_empty() {
        return Err(err("empty host or port in address"));
    }

    Ok((host, port))
}
