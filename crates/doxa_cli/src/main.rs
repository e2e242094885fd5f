use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use doxa_agent::{AgentPipeline, NullSink, PersistenceQueue};
use doxa_core::{DoxaConfig, RawFeeling};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the agent config TOML
    #[arg(short, long, default_value = "doxa.toml")]
    config: String,

    /// JSONL file of raw feelings to feed through the pipeline
    #[arg(short, long)]
    feed: String,

    /// Run a pipeline step after every N accepted feelings
    #[arg(long, default_value_t = 10)]
    step_every: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config = DoxaConfig::load_or_default(&args.config);
    let queue = PersistenceQueue::spawn(Arc::new(NullSink));
    let mut pipeline = AgentPipeline::new(config).with_queue(queue);

    info!("Feeding {} through the pipeline...", args.feed);
    let file =
        File::open(&args.feed).with_context(|| format!("Failed to open feed: {}", args.feed))?;

    let mut accepted = 0usize;
    let mut rejected = 0usize;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawFeeling = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse feed line {}", line_no + 1))?;

        match pipeline.submit(raw, Utc::now()) {
            Ok(_) => accepted += 1,
            Err(e) => {
                warn!("Feed line {} rejected: {}", line_no + 1, e);
                rejected += 1;
                continue;
            }
        }

        if args.step_every > 0 && accepted % args.step_every == 0 {
            let report = pipeline.step(Utc::now());
            info!(
                pruned = report.pruned,
                clusters = report.clusters,
                formed = report.formed.len(),
                evolved = report.evolved.len(),
                superseded = report.superseded.len(),
                "Pipeline step"
            );
        }
    }

    let report = pipeline.step(Utc::now());
    info!(
        accepted,
        rejected,
        formed = report.formed.len(),
        active_beliefs = pipeline.network().active().count(),
        "Feed complete"
    );

    let view = pipeline.view_handle().load_full();
    println!("{}", serde_json::to_string_pretty(&*view)?);
    Ok(())
}
