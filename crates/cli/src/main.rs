// ABOUTME: CLI that regenerates the karaoke stream Atom feed from the video-listing API.
// ABOUTME: Loads config and the API key, runs one fetch-and-write cycle, exits non-zero on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use holofeed_cli::{api_key_from_env, run, Config, RunReport};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fetch upcoming karaoke streams and write them as an Atom feed.
#[derive(Parser, Debug)]
#[command(name = "holofeed")]
#[command(about = "Generate an Atom feed of karaoke streams from the Holodex API", long_about = None)]
struct Args {
    /// TOML config file. Omitted settings keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Feed output path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raw JSON snapshot path.
    #[arg(long, conflicts_with = "no_raw")]
    raw_output: Option<PathBuf>,

    /// Skip the raw JSON snapshot.
    #[arg(long, default_value_t = false)]
    no_raw: bool,

    /// Override the API base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Log as JSON lines instead of text.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.output {
            config.output.feed_path = path.clone();
        }
        if let Some(path) = &self.raw_output {
            config.output.raw_path = Some(path.clone());
        }
        if self.no_raw {
            config.output.raw_path = None;
        }
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.json_logs);

    match execute(&args).await {
        Ok(report) => {
            println!(
                "wrote {} entries ({} fetched) to {}",
                report.entries,
                report.fetched,
                report.feed_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %format!("{:#}", err), "run failed");
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &Args) -> Result<RunReport> {
    // A missing .env file is fine; the key may come from the real environment.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err.into());
        }
    }

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    let api_key = api_key_from_env()?;

    info!(
        base_url = %config.api.base_url,
        topics = config.query.topics.len(),
        feed = %config.output.feed_path.display(),
        "starting run"
    );
    run(&config, &api_key, Utc::now()).await
}
