//! Core business logic for the authentication system.
//!
//! Login checks credentials and issues a bearer token, logout revokes the
//! presented token, and `authenticate` resolves a bearer token into the
//! per-request `AuthContext`.

use crate::auth::models::*;
use crate::auth::revocation::TokenRevocationRegistry;
use crate::errors::{ServiceError, ServiceResult, validation_failure};
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::verify_password;
use crate::utils::jwt::TokenCodec;
use sqlx::SqlitePool;
use validator::Validate;

pub const TOKEN_TYPE: &str = "Bearer";

/// Authentication service for handling login, logout and token resolution
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    codec: &'a TokenCodec,
    registry: &'a dyn TokenRevocationRegistry,
}

impl<'a> AuthService<'a> {
    pub fn new(
        pool: &'a SqlitePool,
        codec: &'a TokenCodec,
        registry: &'a dyn TokenRevocationRegistry,
    ) -> Self {
        AuthService {
            pool,
            codec,
            registry,
        }
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Errors
    /// `Validation` for an empty username or password, `InvalidCredentials`
    /// for an unknown user or a wrong password. The two are not told apart.
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        login_request.validate().map_err(validation_failure)?;

        let user = UserRepository::new(self.pool)
            .get_user_by_username(&login_request.username)
            .await?;

        let user = match user {
            Some(user) if verify_password(&login_request.password, &user.password_hash) => user,
            _ => {
                tracing::warn!(username = %login_request.username, "Failed login attempt");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let issued = self
            .codec
            .issue(&user.username)
            .map_err(|e| ServiceError::internal_error(e.to_string()))?;

        tracing::info!(username = %user.username, role = user.role.as_str(), "User logged in");

        Ok(LoginResponse {
            token: issued.token,
            token_type: TOKEN_TYPE.to_string(),
            username: user.username,
            role: user.role,
            branch_id: user.branch_id,
            branch_name: user.branch_name,
            expires_in: self.codec.ttl_seconds(),
        })
    }

    /// Revokes `token` if it is an unexpired token signed by this server.
    /// Never fails.
    ///
    /// Anything else is dropped without touching the registry, so callers
    /// cannot fill it with junk and force a compaction.
    pub async fn logout(&self, token: Option<&str>) {
        let Some(token) = token else {
            tracing::debug!("Logout without a bearer token");
            return;
        };

        match self.codec.parse_and_verify(token) {
            Ok(claims) => {
                self.registry.revoke(token).await;
                tracing::info!(
                    username = claims.username(),
                    token = %fingerprint(token),
                    "Token revoked on logout"
                );
            }
            Err(e) => {
                tracing::debug!(token = %fingerprint(token), "Logout ignored unusable token: {e}")
            }
        }
    }

    /// Resolves a bearer token into an `AuthContext`.
    ///
    /// A revoked token is an error. Any other problem (bad signature,
    /// expiry, unknown subject) yields `Anonymous`, leaving it to the
    /// handler to decide whether an identity is required.
    pub async fn authenticate(&self, token: Option<&str>) -> ServiceResult<AuthContext> {
        let Some(token) = token else {
            return Ok(AuthContext::Anonymous);
        };

        if self.registry.is_revoked(token).await {
            tracing::warn!(token = %fingerprint(token), "Revoked token presented");
            return Err(ServiceError::TokenRevoked);
        }

        let claims = match self.codec.parse_and_verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(token = %fingerprint(token), "Bearer token rejected: {e}");
                return Ok(AuthContext::Anonymous);
            }
        };

        match UserRepository::new(self.pool)
            .get_user_by_username(claims.username())
            .await?
        {
            Some(user) => Ok(AuthContext::Authenticated(Identity::from(&user))),
            None => {
                tracing::debug!(username = claims.username(), "Token subject no longer exists");
                Ok(AuthContext::Anonymous)
            }
        }
    }
}

/// Short tag for a token in logs: the first 12 hex digits of its BLAKE3 hash.
pub fn fingerprint(token: &str) -> String {
    let digest = blake3::hash(token.as_bytes()).to_hex();
    digest.as_str()[..12].to_string()
}
