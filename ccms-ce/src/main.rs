//! Content Engine (ccms-ce) - Main entry point
//!
//! Authoritative service for the course content tree and its derived
//! durations. Editing tools mutate leaf estimates through this service's
//! write API and read derived totals back from it.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccms_ce::{build_router, AppState};
use ccms_common::config::{prepare_root_folder, resolve_root_folder};
use ccms_common::db::init::{init_database, read_setting_i64};

/// Command-line arguments for ccms-ce
#[derive(Parser, Debug)]
#[command(name = "ccms-ce")]
#[command(about = "Content Engine service for CCMS")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the http_port setting)
    #[arg(short, long, env = "CCMS_CE_PORT")]
    port: Option<u16>,

    /// Root folder containing the content database
    #[arg(short, long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ccms_ce=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting CCMS Content Engine (ccms-ce) v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "CCMS_ROOT_FOLDER");
    let db_path = prepare_root_folder(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let port = match args.port {
        Some(port) => port,
        None => read_setting_i64(&pool, "http_port", 5730).await? as u16,
    };

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("ccms-ce listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
