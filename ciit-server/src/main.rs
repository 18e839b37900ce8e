//! ciit-server - Catalog and session service for climate investment interviews
//!
//! Serves the hand-authored concept catalog and stores participant session
//! records. All state lives in a single data folder of YAML and JSON files.

use anyhow::Result;
use ciit_common::config::{resolve_data_folder, DataFolders};
use ciit_server::{build_router, watcher, AppState, CatalogStore, SessionStore};
use clap::Parser;
use tracing::info;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "ciit-server", version, about = "Climate investment interview catalog and session service")]
struct Args {
    /// Data folder holding the catalog and session files (overrides
    /// CIIT_DATA and the config file)
    #[arg(long)]
    data_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 3001)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting ciit-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // 4-tier resolution: CLI arg, CIIT_DATA, config file, OS default
    let data_folder = resolve_data_folder(args.data_folder.as_deref())?;
    info!("Data folder: {}", data_folder.display());

    let folders = DataFolders::new(data_folder);
    folders.ensure_directories()?;

    let catalog = CatalogStore::new(folders.clone());
    catalog.reload().await?;

    let sessions = SessionStore::new(folders.sessions_dir());

    // Pick up external edits to the catalog files while running
    let _watcher = watcher::spawn_catalog_watcher(catalog.clone(), watcher::DEFAULT_POLL_INTERVAL);

    let state = AppState::new(catalog, sessions);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("ciit-server listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
