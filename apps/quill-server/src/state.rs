//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtConfig,
    JwtTokenService,
};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub session: SessionConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, users) = Self::stores(config).await;

        tracing::info!("Application state initialized");

        Self {
            posts,
            users,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            session: config.session.clone(),
        }
    }

    /// State backed by in-memory stores.
    pub fn in_memory(jwt: JwtConfig, session: SessionConfig) -> Self {
        let (posts, users) = Self::memory_stores();
        Self {
            posts,
            users,
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            session,
        }
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        use quill_infra::database::{PostgresPostRepository, PostgresUserRepository, connect};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::memory_stores();
        };

        match connect(db_config).await {
            Ok(conn) => {
                let conn = Arc::new(conn);
                (
                    Arc::new(PostgresPostRepository::new(Arc::clone(&conn))),
                    Arc::new(PostgresUserRepository::new(conn)),
                )
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::memory_stores()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(_config: &AppConfig) -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Self::memory_stores()
    }

    fn memory_stores() -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        (
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
