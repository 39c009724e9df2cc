use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use study_proxy::{GeminiProvider, ProxyConfig, ProxyState};
use tracing_subscriber::EnvFilter;

/// Inference proxy for the study assistant.
#[derive(Parser, Debug)]
#[command(name = "study-proxy")]
#[command(about = "Forward study questions to Gemini with a fixed JSON answer template")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Override GEMINI_MODEL
    #[arg(short, long)]
    model: Option<String>,

    /// Provider timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real deployments set the variables directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = ProxyConfig::from_env();
    if let Some(model) = args.model {
        config.model = model;
    }
    config.timeout = std::time::Duration::from_secs(args.timeout);
    config.validate().map_err(anyhow::Error::msg)?;

    tracing::info!("study-proxy v{} starting (model {})", env!("CARGO_PKG_VERSION"), config.model);

    let provider = GeminiProvider::new(&config)?;
    let state = ProxyState::new(config, Arc::new(provider));

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tokio::select! {
        result = study_proxy::serve(listener, state) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
            Ok(())
        }
    }
}
