//! Application entry point
//!
//! Loads configuration, opens the store once, and serves HTTP until a
//! shutdown signal arrives.

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tinylink::config::Config;
use tinylink::database::AppState;
use tinylink::route::create_app;
use tinylink::store::CodeStore;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tinylink=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();

    let store = CodeStore::open(&config.database_url).expect("Failed to initialize database");
    let port = config.port;
    let db_name = config.database_url.clone();

    let app = create_app(AppState::new(store, config)).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|err| panic!("Failed to bind {}: {}", addr, err));

    tracing::info!(%addr, database = %db_name, "server running at http://localhost:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolves on Ctrl+C, or SIGTERM on Unix, so in-flight requests and
/// database transactions can finish before exit.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}
