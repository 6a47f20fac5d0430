//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! database URLs, server port, token signing settings and the public-path
//! allow-list consulted by the authentication gate.

use anyhow::{Context, Result, bail};
use std::env;

/// Default set of paths that bypass the authentication gate.
pub const DEFAULT_PUBLIC_PATHS: &str = "/,/health,/api/auth/login,/api/students/public/*";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub server_port: u16,
    pub bcrypt_cost: u32,
    pub revocation_max_entries: usize,
    pub revocation_compact_interval_seconds: u64,
    pub public_paths: PublicPaths,
    pub bootstrap_admin_username: String,
    pub bootstrap_admin_password: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt_expires_in_seconds = env::var("JWT_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse::<u64>()
            .context("JWT_EXPIRES_IN_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value
                .parse::<u32>()
                .context("BCRYPT_COST must be a valid number")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let revocation_max_entries = env::var("REVOCATION_MAX_ENTRIES")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<usize>()
            .context("REVOCATION_MAX_ENTRIES must be a valid number")?;

        let revocation_compact_interval_seconds = env::var("REVOCATION_COMPACT_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .context("REVOCATION_COMPACT_INTERVAL_SECONDS must be a valid number")?;

        let public_paths = PublicPaths::parse(
            &env::var("PUBLIC_PATHS").unwrap_or_else(|_| DEFAULT_PUBLIC_PATHS.to_string()),
        );

        let bootstrap_admin_username =
            env::var("BOOTSTRAP_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let bootstrap_admin_password = env::var("BOOTSTRAP_ADMIN_PASSWORD")
            .ok()
            .filter(|password| !password.is_empty());

        let config = Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_expires_in_seconds,
            server_port,
            bcrypt_cost,
            revocation_max_entries,
            revocation_compact_interval_seconds,
            public_paths,
            bootstrap_admin_username,
            bootstrap_admin_password,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would only fail later, at first use.
    pub fn validate(&self) -> Result<()> {
        if self.revocation_compact_interval_seconds == 0 {
            bail!("REVOCATION_COMPACT_INTERVAL_SECONDS must be greater than zero");
        }
        if self.jwt_expires_in_seconds == 0 || i64::try_from(self.jwt_expires_in_seconds).is_err() {
            bail!("JWT_EXPIRES_IN_SECONDS must be between 1 and {}", i64::MAX);
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }
        if self.max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be greater than zero");
        }
        Ok(())
    }
}

/// Paths that skip identity resolution entirely.
///
/// Entries ending in `/*` match any path under that prefix, everything else
/// must match exactly.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn parse(raw: &str) -> Self {
        let mut paths = Self::default();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.strip_suffix('*') {
                Some(prefix) if prefix.ends_with('/') => paths.prefixes.push(prefix.to_string()),
                _ => paths.exact.push(entry.to_string()),
            }
        }
        paths
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_public_paths() {
        let paths = PublicPaths::parse(DEFAULT_PUBLIC_PATHS);

        assert!(paths.is_public("/"));
        assert!(paths.is_public("/health"));
        assert!(paths.is_public("/api/auth/login"));
        assert!(paths.is_public("/api/students/public/email/a@b.com"));

        assert!(!paths.is_public("/api/students"));
        assert!(!paths.is_public("/api/students/1"));
        assert!(!paths.is_public("/api/auth/me"));
        assert!(!paths.is_public("/api/auth/logout"));
        assert!(!paths.is_public("/healthz"));
    }

    fn sample_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 3,
            jwt_secret: "secret".to_string(),
            jwt_expires_in_seconds: 86400,
            server_port: 3000,
            bcrypt_cost: 12,
            revocation_max_entries: 1000,
            revocation_compact_interval_seconds: 3600,
            public_paths: PublicPaths::parse(DEFAULT_PUBLIC_PATHS),
            bootstrap_admin_username: "admin".to_string(),
            bootstrap_admin_password: None,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_zero_compaction_interval_is_rejected() {
        let config = Config {
            revocation_compact_interval_seconds: 0,
            ..sample_config()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("REVOCATION_COMPACT_INTERVAL_SECONDS"));
    }

    #[test]
    fn test_out_of_range_settings_are_rejected() {
        for config in [
            Config { jwt_expires_in_seconds: 0, ..sample_config() },
            Config { jwt_expires_in_seconds: u64::MAX, ..sample_config() },
            Config { bcrypt_cost: 3, ..sample_config() },
            Config { max_connections: 0, ..sample_config() },
        ] {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        let paths = PublicPaths::parse(" , /health ,,");
        assert!(paths.is_public("/health"));
        assert!(!paths.is_public(""));
    }
}
