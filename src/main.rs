use std::sync::Arc;

use gembridge::config::{load_config, AppConfig};
use gembridge::observability::init_tracing;
use gembridge::server::router;
use gembridge::state::AppState;

fn main() {
    let config = load_config("config.yaml").unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Please copy 'config.example.yaml' to 'config.yaml' and modify as needed.");
        std::process::exit(1);
    });

    init_tracing(&config.server.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize Tokio runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(run(config));
}

async fn run(config: AppConfig) {
    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to initialize: {e}");
        std::process::exit(1);
    });

    tracing::info!(
        "gembridge starting on {}:{} (upstream: {})",
        host,
        port,
        state.upstream.endpoint()
    );

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to bind to {host}:{port}: {e}");
            std::process::exit(1);
        });

    tracing::info!("gembridge is ready to accept connections");

    if let Err(e) = axum::serve(listener, router(Arc::new(state))).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
