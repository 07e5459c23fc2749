//! Main entry point for the NAT connection watcher
use anyhow::Context;
use clap::Parser;
use std::sync::atomic::Ordering;
use std::time::Duration;

use natwatch::classify::BenignFilter;
use natwatch::cli::args::{Cli, OutputFormatArg};
use natwatch::formats::traits::{OutputDestination, OutputFormat, OutputWriter};
use natwatch::report::Reporter;
use natwatch::socket::SsSampler;
use natwatch::watch::{WatchConfig, Watcher};

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    // Build the benign endpoint filter
    let mut filter = BenignFilter::default();
    for suffix in &cli.benign_suffix {
        filter = filter.with_suffix(suffix.as_str());
    }
    for pattern in &cli.benign_pattern {
        filter = filter
            .with_pattern(pattern)
            .with_context(|| format!("--benign-pattern {:?}", pattern))?;
    }

    let sampler = SsSampler::new(cli.ss_path.as_str(), filter).skip_malformed(cli.skip_malformed);

    // Determine output format and destination
    let output_format = match cli.format {
        OutputFormatArg::Text => OutputFormat::Text,
        OutputFormatArg::Table => OutputFormat::Table,
        OutputFormatArg::Json => OutputFormat::Json,
        OutputFormatArg::Jsonl => OutputFormat::Jsonl,
        OutputFormatArg::Csv => OutputFormat::Csv,
    };

    let output_dest = if let Some(output_path) = &cli.output {
        OutputDestination::File(output_path.clone())
    } else {
        OutputDestination::Stdout
    };

    let output_writer = OutputWriter::new(output_format, output_dest)
        .with_context(|| format!("opening output {:?}", cli.output))?;

    let config = WatchConfig {
        interval: Duration::from_millis(cli.interval),
        max_cycles: cli.cycles,
        keep_going: cli.keep_going,
    };

    let mut watcher = Watcher::new(sampler, Reporter::new(!cli.no_unique), output_writer, config);

    // Stop at the next cycle boundary on Ctrl-C
    let running = watcher.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    watcher.run()?;
    Ok(())
}
