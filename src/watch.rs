//! The sample-and-report control loop
use crate::error::WatchResult;
use crate::formats::traits::OutputWriter;
use crate::report::Reporter;
use crate::socket::SocketSource;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity at which the inter-cycle delay checks for cancellation
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Minimum delay after a skipped cycle
pub const RETRY_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default)]
pub struct WatchConfig {
    /// Delay between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Stop after this many cycles; run forever when `None`
    pub max_cycles: Option<u64>,
    /// Log and skip cycles whose subprocess failed instead of aborting
    pub keep_going: bool,
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub cycles: u64,
    pub reports: u64,
    pub skipped: u64,
}

pub struct Watcher<S: SocketSource> {
    source: S,
    reporter: Reporter,
    output: OutputWriter,
    config: WatchConfig,
    running: Arc<AtomicBool>,
}

impl<S: SocketSource> Watcher<S> {
    pub fn new(source: S, reporter: Reporter, output: OutputWriter, config: WatchConfig) -> Self {
        Self {
            source,
            reporter,
            output,
            config,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that stops the loop at the next cycle boundary once cleared.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Run cycles until cancelled, the cycle limit is reached, or a fatal error.
    ///
    /// Each cycle finishes sampling (including the subprocess exit) before the
    /// reporter touches the accumulated state.
    pub fn run(&mut self) -> WatchResult<WatchSummary> {
        let mut summary = WatchSummary::default();
        info!("Watching NAT-relevant connections");

        while self.running.load(Ordering::SeqCst) {
            if let Some(max) = self.config.max_cycles {
                if summary.cycles >= max {
                    break;
                }
            }
            summary.cycles += 1;

            let delay = match self.source.sample() {
                Ok(sample) => {
                    for report in self.reporter.observe(&sample) {
                        self.output.write_report(&report)?;
                        summary.reports += 1;
                    }
                    self.config.interval
                }
                // A Ctrl-C from the terminal also reaches a child in our process group
                Err(e) if !self.running.load(Ordering::SeqCst) => {
                    debug!("Cycle {} interrupted: {}", summary.cycles, e);
                    break;
                }
                Err(e) if self.config.keep_going && e.is_transient() => {
                    warn!("Skipping cycle {}: {}", summary.cycles, e);
                    summary.skipped += 1;
                    self.config.interval.max(RETRY_PAUSE)
                }
                Err(e) => return Err(e),
            };

            if self.config.max_cycles != Some(summary.cycles) {
                self.pause(delay);
            }
        }

        info!(
            "Stopped after {} cycles ({} reports, {} skipped)",
            summary.cycles, summary.reports, summary.skipped
        );
        Ok(summary)
    }

    fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        debug!("Sleeping {:?} before next cycle", delay);

        let deadline = Instant::now() + delay;
        while self.running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
