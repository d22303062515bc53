use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libretto_core::{
    load_config, validate_config, CatchupTriggers, ChapterAnalysis, ConcurrencyGate,
    ExtractionDispatcher, HttpLibraryClient, MediaLibrary, ModeResolver, ModeSnapshot,
    ScopedSessionMonitor, SessionMonitor, WorkQueue,
};

use libretto_server::api::create_router;
use libretto_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LIBRETTO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully (version {})", VERSION);
    info!("Media server: {}", config.media_server.url);

    // Compute config hash for the startup log
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Host collaborators: one HTTP client serves both contracts
    let client = Arc::new(HttpLibraryClient::new(config.media_server.clone()));
    let library: Arc<dyn MediaLibrary> = Arc::clone(&client) as Arc<dyn MediaLibrary>;
    let chapters: Arc<dyn ChapterAnalysis> = client;

    // Session monitor with the configured scopes
    let monitor: Arc<dyn SessionMonitor> = Arc::new(ScopedSessionMonitor::new(
        config.intro_skip.library_scope.clone(),
        config.intro_skip.user_scope.clone(),
    ));

    // Work queues and the concurrency gate
    let extract_queue = Arc::new(WorkQueue::new());
    let analysis_queue = Arc::new(WorkQueue::new());
    let gate = ConcurrencyGate::new(config.extract.max_concurrent);
    info!("Concurrency gate capacity: {}", config.extract.max_concurrent);

    // Catch-up trigger layer
    let triggers = Arc::new(CatchupTriggers::new(
        Arc::clone(&library),
        Arc::clone(&monitor),
        Arc::clone(&extract_queue),
        Arc::clone(&analysis_queue),
    ));

    // Mode resolver; bootstrap applies the configured toggles
    let resolver = Arc::new(ModeResolver::new(
        ModeSnapshot::from_config(&config),
        Arc::clone(&gate),
        Arc::clone(&triggers),
        Arc::clone(&monitor),
    ));
    resolver.bootstrap();

    // Extraction dispatcher + live drain loop
    let dispatcher = Arc::new(ExtractionDispatcher::new(
        Arc::clone(&library),
        chapters,
        Arc::clone(&monitor),
        Arc::clone(&resolver),
        Arc::clone(&gate),
        Arc::clone(&extract_queue),
        Arc::clone(&analysis_queue),
    ));
    dispatcher.start();
    info!("Extraction dispatcher started");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        resolver,
        Arc::clone(&dispatcher),
        triggers,
        extract_queue,
        analysis_queue,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    dispatcher.stop();

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
