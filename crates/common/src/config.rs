//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Environment variable that supplies the Mapbox access token.
pub const MAPBOX_TOKEN_ENV: &str = "EARTHIE__MAP__ACCESS_TOKEN";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend (storage, auth, row store) configuration.
    pub backend: BackendConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Pre-issued session configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Map provider configuration.
    #[serde(default)]
    pub map: MapConfig,
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend project, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Project API key sent with every request.
    pub anon_key: String,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Bucket that post images are uploaded to.
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
        }
    }
}

/// Pre-issued session configuration.
///
/// The backend client never performs authentication itself; a session issued
/// elsewhere is supplied here (or injected programmatically) and presented
/// as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Bearer token of the session.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Id of the authenticated user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Username of the authenticated user.
    #[serde(default)]
    pub username: Option<String>,
    /// Display name of the authenticated user.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL of the authenticated user.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Map provider configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapConfig {
    /// Mapbox access token. Absence is a detected, user-visible state.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl MapConfig {
    /// Returns the typed access state for the map provider.
    #[must_use]
    pub fn access(&self) -> MapboxAccess {
        MapboxAccess::from_option(self.access_token.clone())
    }
}

/// Typed presence of the map provider access token.
///
/// Rendering code matches on this instead of re-reading the environment, so
/// a missing token is an explicit state rather than a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapboxAccess {
    /// No token configured.
    Missing,
    /// A usable access token.
    Token(String),
}

impl MapboxAccess {
    /// Builds the access state from an optional raw token value.
    ///
    /// Blank strings count as missing.
    #[must_use]
    pub fn from_option(token: Option<String>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Self::Token(t),
            _ => Self::Missing,
        }
    }

    /// Returns the token if one is configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Token(t) => Some(t),
            Self::Missing => None,
        }
    }

    /// Returns whether no token is configured.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

fn default_bucket() -> String {
    "lobbyist-posts".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `EARTHIE_ENV`)
    /// 3. Environment variables with `EARTHIE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("EARTHIE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("EARTHIE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("EARTHIE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_map_token_counts_as_missing() {
        assert_eq!(MapboxAccess::from_option(None), MapboxAccess::Missing);
        assert_eq!(
            MapboxAccess::from_option(Some("   ".to_string())),
            MapboxAccess::Missing
        );
        assert!(MapboxAccess::from_option(Some(String::new())).is_missing());
    }

    #[test]
    fn configured_map_token_is_kept_verbatim() {
        let access = MapboxAccess::from_option(Some("pk.test-token".to_string()));
        assert_eq!(access.token(), Some("pk.test-token"));
        assert!(!access.is_missing());
    }

    #[test]
    fn storage_bucket_defaults_to_lobbyist_posts() {
        let storage = StorageConfig::default();
        assert_eq!(storage.bucket, "lobbyist-posts");
    }
}
