//! Output format traits for the NAT connection watcher
use crate::error::WatchResult;
use crate::report::Report;
use std::fs::OpenOptions;
use std::io::Write;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Render one report as a self-contained block.
    fn format_report(&self, report: &Report) -> WatchResult<String>;

    /// Text written once before the first report, if the format needs one.
    fn header(&self) -> WatchResult<Option<String>> {
        Ok(None)
    }
}

/// Enum for output format types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Table,
    Json,
    Jsonl,
    Csv,
}

/// Enum for output destination
#[derive(Debug, Clone)]
pub enum OutputDestination {
    Stdout,
    File(std::path::PathBuf),
}

/// Output writer that combines format and destination
pub struct OutputWriter {
    formatter: Box<dyn OutputFormatter>,
    sink: Box<dyn Write + Send>,
    started: bool,
}

impl OutputWriter {
    /// Create a new output writer. File destinations are opened for appending.
    pub fn new(format: OutputFormat, destination: OutputDestination) -> WatchResult<Self> {
        let formatter: Box<dyn OutputFormatter> = match format {
            OutputFormat::Text => Box::new(crate::formats::text::TextFormatter),
            OutputFormat::Table => Box::new(crate::formats::table::TableFormatter),
            OutputFormat::Json => Box::new(crate::formats::json::JsonFormatter),
            OutputFormat::Jsonl => Box::new(crate::formats::jsonl::JsonlFormatter),
            OutputFormat::Csv => Box::new(crate::formats::csv::CsvFormatter),
        };

        let sink: Box<dyn Write + Send> = match destination {
            OutputDestination::Stdout => Box::new(std::io::stdout()),
            OutputDestination::File(path) => {
                Box::new(OpenOptions::new().create(true).append(true).open(path)?)
            }
        };

        Ok(Self {
            formatter,
            sink,
            started: false,
        })
    }

    /// Write one report to the configured destination
    pub fn write_report(&mut self, report: &Report) -> WatchResult<()> {
        if !self.started {
            if let Some(header) = self.formatter.header()? {
                self.sink.write_all(header.as_bytes())?;
            }
            self.started = true;
        }

        let content = self.formatter.format_report(report)?;
        self.sink.write_all(content.as_bytes())?;
        self.sink.flush()?;
        Ok(())
    }
}
