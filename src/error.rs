//! Error types for the NAT connection watcher
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    /// The socket-listing command could not be started.
    #[error("{command}: failed to start: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the command's output failed for a reason other than end of stream.
    #[error("{command}:\nprocessing output: {source}")]
    Read {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully.
    #[error("{command}: {status}\n{stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{command}:\nunexpected short line: {line:?}")]
    MalformedLine { command: String, line: String },

    #[error("{command}:\nunexpected remoteAddr: {addr:?}")]
    BadRemoteAddr { command: String, addr: String },

    #[error("address {addr:?}: {reason}")]
    AddrParse { addr: String, reason: &'static str },

    #[error("invalid benign host pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV into_inner error: {0}")]
    CsvIntoInner(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl WatchError {
    /// Errors caused by the subprocess itself rather than by what it printed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WatchError::Launch { .. } | WatchError::Read { .. } | WatchError::CommandFailed { .. }
        )
    }

    /// Errors caused by a single unexpected output line.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            WatchError::MalformedLine { .. } | WatchError::BadRemoteAddr { .. }
        )
    }
}

pub type WatchResult<T> = Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_names_line() {
        let err = WatchError::MalformedLine {
            command: "ss".to_string(),
            line: "tcp ESTAB 0".to_string(),
        };
        assert!(err.to_string().contains("\"tcp ESTAB 0\""));
        assert!(err.is_malformed());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_launch_is_transient() {
        let err = WatchError::Launch {
            command: "ss".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("not found"));
    }
}
