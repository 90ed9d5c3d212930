/// Application context and dependency injection
use crate::{
    books::BookRepository,
    circulation::CirculationManager,
    comments::CommentManager,
    config::ServerConfig,
    db,
    error::{AppError, AppResult},
    identity::IdentityResolver,
    media::MediaStore,
};
use std::sync::Arc;

/// Application context holding all shared services.
///
/// Constructed exactly once on the startup path and injected into handlers
/// via axum state; every service shares the same process-wide pool.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub identity: Arc<IdentityResolver>,
    pub books: Arc<BookRepository>,
    pub circulation: Arc<CirculationManager>,
    pub comments: Arc<CommentManager>,
    pub media: Arc<MediaStore>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize the library database
        let pool = db::create_pool(&config.storage.library_db, db::DatabaseOptions::default())
            .await?;

        // Run migrations
        db::run_migrations(&pool).await?;

        // Test connection
        db::test_connection(&pool).await?;

        let identity = Arc::new(IdentityResolver::new(
            pool.clone(),
            config.identity.admin_email.clone(),
        ));
        let books = Arc::new(BookRepository::new(pool.clone()));
        let circulation = Arc::new(CirculationManager::new(pool.clone()));
        let comments = Arc::new(CommentManager::new(pool.clone()));
        let media = Arc::new(MediaStore::new(&config));

        Ok(Self {
            config: Arc::new(config),
            identity,
            books,
            circulation,
            comments,
            media,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> AppResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        if let crate::config::MediaStoreConfig::Disk { location } = &config.storage.media {
            tokio::fs::create_dir_all(location).await?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
