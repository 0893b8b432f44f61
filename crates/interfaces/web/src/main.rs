mod routes;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mentor_config::AppConfig;
use mentor_llm::GeminiClient;
use mentor_memory::FileStore;
use mentor_runtime::ChatRuntime;
use mentor_speech::MurfClient;

use routes::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "mentor",
    version,
    about = "Memory-augmented personal mentor chat service"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config/default.toml")]
    config: String,
    /// Listen port (overrides config file and the PORT env var).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level)),
        )
        .init();

    let generator = Arc::new(GeminiClient::new(&config.llm));
    let store = Arc::new(FileStore::new(&config.memory.path));
    let runtime = Arc::new(ChatRuntime::new(generator, store, &config.memory));
    let speech = Arc::new(MurfClient::new(&config.speech));

    let app = routes::router(AppState { runtime, speech }, &config.server.public_dir);

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "mentor server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
