use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::database::{seed::seed, DatabaseManager, MemoryStore, PgStore, Store};

pub async fn handle(args: ServeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let (store, pool): (Arc<dyn Store>, Option<PgPool>) = if args.memory {
        tracing::warn!("Serving from the in-memory store; data is lost on exit");
        (Arc::new(MemoryStore::new()), None)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        if config.database.run_migrations {
            DatabaseManager::bootstrap(&pool, &config.environment).await?;
        }
        (Arc::new(PgStore::new(pool.clone())), Some(pool))
    };

    if args.seed {
        seed(store.as_ref()).await.context("failed to seed sample data")?;
    }

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("userbase API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(store, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }
    Ok(())
}

async fn shutdown_signal() {
    wait_for(tokio::signal::ctrl_c()).await
}

/// Resolve once `signal` fires. A signal that cannot be installed never
/// resolves, so the server keeps running instead of stopping at once.
async fn wait_for(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
