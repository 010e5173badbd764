use anyhow::{Context, Result};
use clap::Parser;
use speechdigest::config::Config;
use speechdigest::pipeline::{print_report, Pipeline, PipelineOptions};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "speechdigest")]
#[command(version, about = "Transcribe, summarize, and analyze an audio recording")]
#[command(
    long_about = "Transcribe an audio file with OpenAI Whisper, summarize it, and extract topic analytics. Saves the transcript, summary, and analysis as timestamped files in the current directory."
)]
struct Cli {
    /// Input audio file
    input: PathBuf,

    /// Minimum number of topics to request (defaults to config value)
    #[arg(long)]
    top_n: Option<usize>,

    /// Disable progress spinners
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Validate input before any service call
    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    // Load and validate configuration
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    info!("Input: {}", cli.input.display());

    let options = PipelineOptions {
        top_n: cli.top_n.unwrap_or(config.top_n_topics),
        show_progress: !cli.quiet,
    };

    let pipeline = Pipeline::from_config(&config)?.with_options(options);
    let outcome = pipeline.run(&cli.input).await?;

    print_report(&outcome);

    Ok(())
}
