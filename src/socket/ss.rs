//! Sampler backed by the iproute2 `ss` utility
use crate::classify::BenignFilter;
use crate::error::{WatchError, WatchResult};
use crate::socket::{parse_line, Sample, SocketSource};
use log::{debug, trace, warn};
use std::io::{BufRead, BufReader, Read};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;

/// Arguments for connected TCP/UDP sockets with process attribution and
/// resolved names, excluding loopback and metadata-service destinations.
pub const SS_ARGS: [&str; 9] = [
    "--process",
    "--oneline",
    "--no-header",
    "--resolve",
    "--tcp",
    "--udp",
    "state",
    "connected",
    "! ( dst = localhost || dst = metadata )",
];

pub struct SsSampler {
    program: String,
    filter: BenignFilter,
    skip_malformed: bool,
}

impl SsSampler {
    pub fn new(program: impl Into<String>, filter: BenignFilter) -> Self {
        Self {
            program: program.into(),
            filter,
            skip_malformed: false,
        }
    }

    /// Log and drop unparsable lines instead of failing the cycle.
    pub fn skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    /// Human-readable description of the invocation, used in error messages.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(SS_ARGS.iter().map(|a| a.to_string()));
        parts.join(" ")
    }

    /// Read the facility's output line by line until end of stream and
    /// classify every record.
    pub fn parse_output<R: BufRead>(&self, mut reader: R) -> WatchResult<Sample> {
        let command = self.command_line();
        let mut sample = Sample::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| WatchError::Read {
                    command: command.clone(),
                    source,
                })?;
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            trace!("ss: {}", line);

            let record = match parse_line(&command, line) {
                Ok(record) => record,
                Err(e) if self.skip_malformed && e.is_malformed() => {
                    warn!("Skipping line: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.filter.is_benign(&record.host) {
                sample.filtered += 1;
                continue;
            }
            sample.records.push(record);
        }

        Ok(sample)
    }
}

impl SocketSource for SsSampler {
    fn sample(&mut self) -> WatchResult<Sample> {
        let command = self.command_line();
        let mut child = Command::new(&self.program)
            .args(SS_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Own process group: a terminal Ctrl-C stops the loop, not the cycle in flight
            .process_group(0)
            .spawn()
            .map_err(|source| WatchError::Launch {
                command: command.clone(),
                source,
            })?;

        // Drain stderr concurrently so a chatty child cannot block on a full pipe
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text);
                text
            })
        });

        let parsed = match child.stdout.take() {
            Some(stdout) => self.parse_output(BufReader::new(stdout)),
            None => Ok(Sample::default()),
        };

        if parsed.is_err() {
            let _ = child.kill();
        }
        let status = child.wait().map_err(|source| WatchError::Read {
            command: command.clone(),
            source,
        })?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        let sample = parsed?;
        if !status.success() {
            return Err(WatchError::CommandFailed {
                command,
                status,
                stderr,
            });
        }

        debug!(
            "Sampled {} NAT-relevant connections ({} benign filtered)",
            sample.records.len(),
            sample.filtered
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OUTPUT: &str = "\
tcp ESTAB 0 0 10.128.0.2:41234 lga25s71-in-f14.1e100.net:https users:((\"chrome\",pid=10,fd=3))
tcp ESTAB 0 0 10.128.0.2:41236 93.184.216.34:https users:((\"curl\",pid=11,fd=3))
udp ESTAB 0 0 10.128.0.2:5353 [2001:db8::1]:domain
tcp SYN-SENT 0 1 10.128.0.2:41238 ord38s04-in-f3.1e100.net:https
";

    fn sampler() -> SsSampler {
        SsSampler::new("ss", BenignFilter::default())
    }

    #[test]
    fn test_parse_output_filters_benign_hosts() {
        let sample = sampler().parse_output(Cursor::new(OUTPUT)).unwrap();
        assert_eq!(sample.filtered, 2);
        assert_eq!(sample.records.len(), 2);
        assert_eq!(sample.records[0].host, "93.184.216.34");
        assert_eq!(sample.records[1].host, "2001:db8::1");
        assert!(sample.records.iter().all(|r| !r.host.ends_with(".1e100.net")));
    }

    #[test]
    fn test_parse_output_short_line_aborts() {
        let input = "tcp ESTAB 0 0 10.128.0.2:41236 93.184.216.34:https\ntcp ESTAB 0\n";
        let err = sampler().parse_output(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("unexpected short line: \"tcp ESTAB 0\""));
    }

    #[test]
    fn test_parse_output_skip_malformed() {
        let input = "tcp ESTAB 0\ntcp ESTAB 0 0 10.128.0.2:41236 93.184.216.34:https\n";
        let sample = sampler()
            .skip_malformed(true)
            .parse_output(Cursor::new(input))
            .unwrap();
        assert_eq!(sample.records.len(), 1);
    }

    #[test]
    fn test_parse_output_empty() {
        let sample = sampler().parse_output(Cursor::new("")).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_command_line_includes_filter() {
        let line = sampler().command_line();
        assert!(line.starts_with("ss --process --oneline"));
        assert!(line.ends_with("! ( dst = localhost || dst = metadata )"));
    }

    #[test]
    fn test_launch_failure() {
        let mut sampler = SsSampler::new("/nonexistent/natwatch-ss", BenignFilter::default());
        let err = sampler.sample().unwrap_err();
        assert!(matches!(err, WatchError::Launch { .. }));
    }
}
