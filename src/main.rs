use rusty_library_circulation::{
    adapters::memory::InMemoryStore,
    adapters::postgres::{
        self, PostgresCatalogStore, PostgresLoanLedgerStore, PostgresMemberStore,
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
    config::{AppConfig, StorageBackend},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize adapters; the pool (if any) lives for the whole process
    let (service_deps, pool) = match config.storage.backend {
        StorageBackend::Postgres => {
            tracing::info!(max_connections = config.database.max_connections, "Connecting to PostgreSQL");
            let pool = postgres::connect(&config.database).await?;

            let service_deps = ServiceDependencies {
                catalog_store: Arc::new(PostgresCatalogStore::new(pool.clone())),
                member_store: Arc::new(PostgresMemberStore::new(pool.clone())),
                loan_ledger_store: Arc::new(PostgresLoanLedgerStore::new(pool.clone())),
            };
            (service_deps, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            let store = InMemoryStore::new();

            let service_deps = ServiceDependencies {
                catalog_store: Arc::new(store.clone()),
                member_store: Arc::new(store.clone()),
                loan_ledger_store: Arc::new(store),
            };
            (service_deps, None)
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
