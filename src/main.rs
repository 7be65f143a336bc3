use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use snaptag::{
    resolve_token, BatchConfig, BatchPipeline, BatchSummary, LogProgress, PhotoTagClient,
};

/// Environment variable consulted when --api-token is not given.
const TOKEN_ENV_VAR: &str = "SNAPTAG_API_TOKEN";

#[derive(Parser)]
#[command(
    name = "snaptag",
    version,
    about = "Batch JPEG keywording: fetch AI metadata and embed it as EXIF"
)]
struct Args {
    /// Folder containing the JPEG images to process.
    folder: PathBuf,

    /// Bearer token for the annotation service (falls back to SNAPTAG_API_TOKEN).
    #[arg(long)]
    api_token: Option<String>,

    /// Override the annotation service endpoint.
    #[arg(long)]
    endpoint: Option<String>,
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    match run(args) {
        Ok(summary) => {
            info!(
                "{} images processed: {} ready, {} failed",
                summary.total, summary.ready, summary.failed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<BatchSummary, Box<dyn std::error::Error>> {
    let token = resolve_token(args.api_token.as_deref(), TOKEN_ENV_VAR)?;
    let mut config = BatchConfig::new(token);
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    let client = PhotoTagClient::new(config)?;
    let pipeline = BatchPipeline::new(Box::new(client));
    Ok(pipeline.run(&args.folder, &LogProgress)?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
