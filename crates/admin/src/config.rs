//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PETSHOP_API_BASE_URL` - Backend REST base address (default: `http://localhost:3000/api/v1`)
//! - `PETSHOP_SESSION_FILE` - Durable session file (default: `.petshop/session.json`)
//! - `PETSHOP_HTTP_TIMEOUT_SECS` - Per-request timeout; unset means requests never time out
//! - `GOOGLE_MAPS_API_KEY` - Enables the store location picker
//! - `GOOGLE_MAPS_API_BASE` - Geocoding/Places base address (default: `https://maps.googleapis.com`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api/v1";
pub const DEFAULT_SESSION_FILE: &str = ".petshop/session.json";
pub const DEFAULT_MAPS_API_BASE: &str = "https://maps.googleapis.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Where the session survives between runs
    pub session_file: PathBuf,
    /// Map picker configuration (optional)
    pub maps: Option<MapsConfig>,
}

/// Backend REST API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base address every request path is joined onto
    pub base_url: Url,
    /// Per-request timeout; `None` waits forever
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Settings for a backend at `base_url` with no timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("PETSHOP_API_BASE_URL", base_url)?,
            timeout: None,
        })
    }
}

/// Google Maps configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct MapsConfig {
    /// Browser/server API key
    pub api_key: SecretString,
    /// Base address for the Geocoding and Places web services
    pub api_base: Url,
}

impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl MapsConfig {
    /// Maps settings against the public Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the key looks like a placeholder.
    pub fn new(api_key: SecretString) -> Result<Self, ConfigError> {
        validate_not_placeholder(api_key.expose_secret(), "GOOGLE_MAPS_API_KEY")?;
        Ok(Self {
            api_key,
            api_base: parse_base_url("GOOGLE_MAPS_API_BASE", DEFAULT_MAPS_API_BASE)?,
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let base_url = parse_base_url(
            "PETSHOP_API_BASE_URL",
            &get_or_default("PETSHOP_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;

        let timeout = lookup("PETSHOP_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("PETSHOP_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let session_file = PathBuf::from(get_or_default("PETSHOP_SESSION_FILE", DEFAULT_SESSION_FILE));

        let maps = match lookup("GOOGLE_MAPS_API_KEY").filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                validate_not_placeholder(&key, "GOOGLE_MAPS_API_KEY")?;
                let api_base = parse_base_url(
                    "GOOGLE_MAPS_API_BASE",
                    &get_or_default("GOOGLE_MAPS_API_BASE", DEFAULT_MAPS_API_BASE),
                )?;
                Some(MapsConfig {
                    api_key: SecretString::from(key),
                    api_base,
                })
            }
            None => None,
        };

        Ok(Self {
            api: ApiConfig { base_url, timeout },
            session_file,
            maps,
        })
    }

    /// Returns a reference to the maps configuration (if configured).
    #[must_use]
    pub const fn maps(&self) -> Option<&MapsConfig> {
        self.maps.as_ref()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, normalising away a trailing slash so paths join cleanly.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Reject values that are obviously copied from a template.
fn validate_not_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3000/api/v1");
        assert_eq!(config.api.timeout, None);
        assert_eq!(config.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert!(config.maps().is_none());
    }

    #[test]
    fn test_trailing_slash_is_normalised() {
        let config = load(&[("PETSHOP_API_BASE_URL", "https://api.petshop.id/v1/")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://api.petshop.id/v1");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("PETSHOP_API_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref name, _) if name == "PETSHOP_API_BASE_URL"));
    }

    #[test]
    fn test_timeout_parsing() {
        let config = load(&[("PETSHOP_HTTP_TIMEOUT_SECS", "15")]).unwrap();
        assert_eq!(config.api.timeout, Some(Duration::from_secs(15)));

        let config = load(&[("PETSHOP_HTTP_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.api.timeout, None);

        assert!(load(&[("PETSHOP_HTTP_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_maps_key_enables_maps() {
        let config = load(&[("GOOGLE_MAPS_API_KEY", "AIzaSyA1b2C3d4E5f6G7h8")]).unwrap();
        let maps = config.maps().unwrap();
        assert_eq!(maps.api_base.as_str(), "https://maps.googleapis.com/");
        assert_eq!(maps.api_key.expose_secret(), "AIzaSyA1b2C3d4E5f6G7h8");
    }

    #[test]
    fn test_maps_placeholder_key_rejected() {
        let err = load(&[("GOOGLE_MAPS_API_KEY", "your-google-maps-key")]).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_maps_config_debug_redacts_key() {
        let maps = MapsConfig::new(SecretString::from("AIzaSyRealLookingKey123")).unwrap();
        let debug = format!("{maps:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AIzaSyRealLookingKey123"));
    }
}
