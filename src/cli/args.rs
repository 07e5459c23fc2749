//! Command-line argument parsing for the NAT connection watcher
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "natwatch")]
#[command(about = "Diagnose NAT port exhaustion from the live socket table", long_about = None)]
pub struct Cli {
    /// Path to the ss binary
    #[arg(long, value_name = "PATH", default_value = "ss")]
    pub ss_path: String,

    /// Delay between cycles in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = 0)]
    pub interval: u64,

    /// Stop after this many cycles (default: run until interrupted)
    #[arg(short = 'n', long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormatArg,

    /// Append reports to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<std::path::PathBuf>,

    /// Additional host suffix to treat as benign (repeatable)
    #[arg(long, value_name = "SUFFIX")]
    pub benign_suffix: Vec<String>,

    /// Additional host regex to treat as benign (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub benign_pattern: Vec<String>,

    /// Do not track distinct (remote, local) address pairs
    #[arg(long)]
    pub no_unique: bool,

    /// Skip cycles where ss fails to run instead of exiting
    #[arg(long)]
    pub keep_going: bool,

    /// Skip unparsable ss lines instead of exiting
    #[arg(long)]
    pub skip_malformed: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (status messages)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Default log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormatArg {
    Text,
    Table,
    Json,
    Jsonl,
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["natwatch"]).unwrap();
        assert_eq!(cli.ss_path, "ss");
        assert_eq!(cli.interval, 0);
        assert!(cli.cycles.is_none());
        assert!(cli.format == OutputFormatArg::Text);
        assert!(!cli.no_unique);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_repeatable_filters() {
        let cli = Cli::try_parse_from([
            "natwatch",
            "--benign-suffix",
            ".internal",
            "--benign-suffix",
            ".corp",
            "--benign-pattern",
            "^10\\.",
            "-n",
            "5",
            "-f",
            "jsonl",
            "-d",
        ])
        .unwrap();
        assert_eq!(cli.benign_suffix, vec![".internal", ".corp"]);
        assert_eq!(cli.benign_pattern, vec!["^10\\."]);
        assert_eq!(cli.cycles, Some(5));
        assert!(cli.format == OutputFormatArg::Jsonl);
        assert_eq!(cli.log_level(), "debug");
    }
}
