//! Filegate - object storage download gateway

use clap::Parser;
use filegate_cli::config::parse_version_mapping;
use filegate_cli::{GatewayConfig, ProviderConfig, run_server};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filegate")]
#[command(about = "HTTP gateway for downloading files from object storage")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "FILEGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "FILEGATE_PORT")]
    port: u16,

    /// Shared secret every request must present
    #[arg(long, env = "ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Header carrying the shared secret
    #[arg(long, default_value = "ACCESS_KEY", env = "ACCESS_KEY_HEADER")]
    access_key_header: String,

    /// Error-monitoring endpoint (disabled when unset)
    #[arg(long, env = "MONITOR_DSN")]
    monitor_dsn: Option<String>,

    /// Storage providers, credentials read from <NAME>_AWS_* variables
    #[arg(long, default_value = "bucketeer", env = "STORAGE_PROVIDERS", value_delimiter = ',')]
    providers: Vec<String>,

    /// Provider for versioned requests without a mapping (empty disables the fallback)
    #[arg(long, default_value = "bucketeer", env = "DEFAULT_PROVIDER")]
    default_provider: String,

    /// API version to provider mapping (e.g. v1=bucketeer)
    #[arg(long = "api-version", env = "API_VERSIONS", value_delimiter = ',', value_parser = parse_version_mapping)]
    api_versions: Vec<(String, String)>,

    /// Directory for temporary downloads
    #[arg(long, default_value = "tmp", env = "FILEGATE_TEMP_DIR")]
    temp_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long, env = "FILEGATE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("filegate_cli={},filegate_storage={},tower_http=debug", log_level, log_level).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Filegate on {}:{}", args.host, args.port);

    let providers: Vec<ProviderConfig> = args
        .providers
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(ProviderConfig::from_env)
        .collect();

    for provider in &providers {
        if let Err(e) = provider.s3_config() {
            tracing::warn!("{}", e);
        }
    }

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        access_key: args.access_key,
        access_key_header: args.access_key_header,
        monitor_dsn: args.monitor_dsn,
        temp_dir: args.temp_dir,
        providers,
        default_provider: Some(args.default_provider).filter(|name| !name.is_empty()),
        api_versions: args.api_versions.into_iter().collect(),
    };

    run_server(config).await
}
