//! Shared application state handed to every handler and the auth gate.

use crate::auth::revocation::{InMemoryRevocationRegistry, TokenRevocationRegistry};
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::services::branch_service::BranchService;
use crate::services::student_service::StudentService;
use crate::services::user_service::UserService;
use crate::utils::jwt::{TokenCodec, TokenError};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub codec: Arc<TokenCodec>,
    pub registry: Arc<dyn TokenRevocationRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the state with an in-memory revocation registry sized from
    /// `config`.
    ///
    /// # Errors
    /// Fails when the signing secret is empty.
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, TokenError> {
        let registry = Arc::new(InMemoryRevocationRegistry::new(
            config.revocation_max_entries,
        ));
        Self::with_registry(pool, config, registry)
    }

    pub fn with_registry(
        pool: SqlitePool,
        config: Config,
        registry: Arc<dyn TokenRevocationRegistry>,
    ) -> Result<Self, TokenError> {
        let codec = TokenCodec::new(&config.jwt_secret, config.jwt_expires_in_seconds)?;

        Ok(AppState {
            pool,
            codec: Arc::new(codec),
            registry,
            config: Arc::new(config),
        })
    }

    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(&self.pool, &self.codec, self.registry.as_ref())
    }

    pub fn branch_service(&self) -> BranchService<'_> {
        BranchService::new(&self.pool)
    }

    pub fn student_service(&self) -> StudentService<'_> {
        StudentService::new(&self.pool)
    }

    pub fn user_service(&self) -> UserService<'_> {
        UserService::new(&self.pool, self.config.bcrypt_cost)
    }
}
