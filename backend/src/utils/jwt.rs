//! JWT token utilities for authentication.
//!
//! Provides signed token creation and verification. The codec only answers
//! "is this token authentic and unexpired"; revocation is layered on top by
//! the authentication gate.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT Claims structure identifying the token's subject
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Unique token id, so two tokens issued in the same second differ
    pub jti: String,
    /// Token issued at timestamp (UTC epoch seconds)
    pub iat: i64,
    /// Token expiration timestamp (UTC epoch seconds)
    pub exp: i64,
}

impl Claims {
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,
    #[error("Token signature is invalid")]
    SignatureInvalid,
    #[error("Token has expired")]
    Expired,
    #[error("Token signing failed: {0}")]
    Signing(String),
    #[error("Token signing key is not configured")]
    MissingSecret,
    #[error("Token lifetime of {0} seconds is out of range")]
    InvalidLifetime(u64),
}

/// A freshly signed token together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies HS256 tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenCodec {
    /// Create a codec from the signing secret and token lifetime.
    pub fn new(secret: &str, ttl_seconds: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or(TokenError::InvalidLifetime(ttl_seconds))?;

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is checked by hand against the same clock `issue` uses.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        Ok(TokenCodec {
            encoding_key,
            decoding_key,
            validation,
            ttl_seconds: ttl,
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Generate a new token for `subject`, valid for the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, TokenError> {
        let exp = now
            .checked_add(self.ttl_seconds)
            .ok_or_else(|| TokenError::Signing("token expiry overflows".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            jti: Uuid::now_v7().to_string(),
            iat: now,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Validate and decode a token.
    pub fn parse_and_verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
