use clap::Parser;
use inukadas_core::{ContentGenerator, GeminiClient};
use inukadas_proxy::auth::{FirebaseVerifier, IdentityVerifier};
use inukadas_proxy::config::ProxyConfig;
use inukadas_proxy::http_server::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inukadas-proxy", about = "Authenticated Gemini proxy for the memo app")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP server address
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Gemini model to use
    #[arg(short = 'o', long)]
    model: Option<String>,

    /// Path of the proxy endpoint
    #[arg(long)]
    route_path: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting inukadas proxy");

    // Load config from file or use defaults
    let mut config = match &args.config {
        Some(path) => ProxyConfig::load_from_file(path),
        None => ProxyConfig::load_from_default(),
    }
    .map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    config.apply_env()?;

    // Update config from CLI args
    if let Some(addr) = args.http_addr {
        config.http_addr = addr;
    }
    if let Some(model) = args.model {
        config.gemini.model_name = Some(model);
    }
    if let Some(route_path) = args.route_path {
        config.route_path = route_path;
    }

    // Initialize Gemini client; without a key the server still answers with a configuration error
    let generator: Option<Arc<dyn ContentGenerator>> = if config.gemini.has_api_key() {
        let client = GeminiClient::new(&config.gemini).map_err(|e| {
            error!(error = %e, "Failed to initialize Gemini client");
            anyhow::anyhow!("Failed to initialize Gemini client: {}", e)
        })?;
        info!(model = %client.model_name(), "Initialized Gemini client");
        Some(Arc::new(client))
    } else {
        warn!("GEMINI_API_KEY is not configured; requests will fail until it is set");
        None
    };

    let verifier: Arc<dyn IdentityVerifier> = Arc::new(FirebaseVerifier::new(&config.auth)?);

    let state = AppState::new(config, generator, verifier);
    http_server::run_server(state).await?;

    info!("Proxy shutting down");
    Ok(())
}
