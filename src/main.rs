/// Lectern - library management service
///
/// Users browse, borrow, like, and discuss books; an admin uploads new
/// books whose cover and document payloads are forwarded to an object
/// store.

mod api;
mod auth;
mod books;
mod circulation;
mod comments;
mod config;
mod context;
mod db;
mod error;
mod identity;
mod media;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::AppResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context; the pool and media client constructed
    // here are the only process-wide shared resources.
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
