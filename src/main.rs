use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blog_portal_api::config::AppConfig;
use blog_portal_api::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use blog_portal_api::{app, AppState};

#[derive(Parser)]
#[command(name = "blog-portal-api")]
#[command(about = "HTTP API backing the blog portal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(ServeArgs),
}

#[derive(clap::Args, Default)]
struct ServeArgs {
    #[arg(long, help = "Listening port, overrides PORT")]
    port: Option<u16>,

    #[arg(long, help = "Keep documents in process memory instead of PostgreSQL")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ACCESS_TOKEN_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Serve(args)) => args,
        None => ServeArgs::default(),
    };

    if let Err(e) = serve(args).await {
        tracing::error!("Startup failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting blog portal API in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = if args.in_memory {
        tracing::warn!("Using in-memory document store; data is lost on exit");
        Arc::new(MemoryDocumentStore::new())
    } else {
        let url = config.database_url().context("invalid configuration")?;
        Arc::new(
            PgDocumentStore::connect(url, &config.database)
                .await
                .context("failed to connect to document store")?,
        )
    };

    let state = AppState::new(&config, store);
    let router = app(state, &config.security.cors_origins);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Blog portal server is running on port: {}", port);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
