use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use clipforge::{
    config::EditOptions,
    job::{InMemoryJobStore, JobController, JobStatus},
};

#[derive(Parser)]
#[command(
    name = "clipforge",
    version,
    about = "Batch video editor: segment, apply effects, stitch and render",
    long_about = "Clipforge slices an input video into timed segments, applies a configurable \
chain of visual and audio effects to each segment, stitches the segments back together with \
optional transitions, overlays background music and renders the result at a chosen quality."
)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the rendered output
    #[arg(short, long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Edit options file (TOML); defaults apply when omitted
    #[arg(short = 'c', long)]
    options: Option<PathBuf>,

    /// Quality preset (720p, 1080p, 4k)
    #[arg(short, long)]
    quality: Option<String>,

    /// Maximum concurrently processing jobs
    #[arg(short, long)]
    workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Clipforge v{}", env!("CARGO_PKG_VERSION"));

    let mut options = match &cli.options {
        Some(path) => {
            info!("Loading edit options from {:?}", path);
            EditOptions::from_file(path)?
        }
        None => {
            info!("Using default edit options");
            EditOptions::default()
        }
    };
    if let Some(quality) = cli.quality {
        options.quality.preset = quality;
    }

    let workers = cli.workers.unwrap_or_else(num_cpus::get);
    let store = Arc::new(InMemoryJobStore::new());
    let controller = JobController::new(store, &cli.output_dir, workers);

    let job_id = controller.submit("cli", &cli.input, options)?;
    info!("Job {} submitted", job_id);

    let mut last_progress = 0;
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let job = match controller.status(&job_id) {
            Some(job) => job,
            None => anyhow::bail!("job {} disappeared from the store", job_id),
        };

        if job.progress != last_progress {
            info!("Progress: {}% ({})", job.progress, job.status.as_str());
            last_progress = job.progress;
        }

        match job.status {
            JobStatus::Completed => {
                let output = job.output_path.expect("completed job carries an output path");
                info!("Done! Output saved to {:?}", output);
                return Ok(());
            }
            JobStatus::Error => {
                anyhow::bail!("job failed: {}", job.error.unwrap_or_else(|| "unknown error".into()));
            }
            JobStatus::Cancelled => {
                anyhow::bail!("job was cancelled");
            }
            JobStatus::Queued | JobStatus::Processing => {}
        }
    }
}
