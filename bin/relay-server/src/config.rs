//! Server configuration, loaded from environment variables at startup.
//!
//! `main` calls `dotenvy::dotenv()` first, so a local `.env` file is merged
//! into the process environment when present.

use std::fmt;
use std::time::Duration;

/// Identifier used whenever a request names no model or an unsupported one.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Allow-list of identifiers a request may select.
pub const SUPPORTED_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash",
];

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Provider credential.  `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Runtime configuration for relay-server.
///
/// Every field has a default, so the server starts without any environment
/// variables.  Without `GOOGLE_API_KEY` it starts anyway and reports every
/// provider-backed operation as unavailable.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// Provider credential; blank values count as unset.
    pub api_key: Option<ApiKey>,

    /// Fallback model identifier.  Always a member of `supported_models`.
    pub default_model: String,

    pub supported_models: Vec<String>,

    /// Base URL of the Generative Language API.
    pub provider_base_url: String,

    /// Overall timeout for one provider round-trip.
    pub provider_timeout: Duration,

    /// Comma-separated list of allowed CORS origins; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_model = var_or(&lookup, "RELAY_DEFAULT_MODEL", DEFAULT_MODEL);

        let mut supported_models: Vec<String> = match lookup("RELAY_SUPPORTED_MODELS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            None => SUPPORTED_MODELS.iter().map(|s| (*s).to_owned()).collect(),
        };
        if !supported_models.contains(&default_model) {
            supported_models.push(default_model.clone());
        }

        Self {
            bind_address: var_or(&lookup, "RELAY_BIND", "0.0.0.0:8000"),
            api_key: lookup("GOOGLE_API_KEY")
                .map(|k| k.trim().to_owned())
                .filter(|k| !k.is_empty())
                .map(ApiKey::new),
            default_model,
            supported_models,
            provider_base_url: var_or(&lookup, "RELAY_PROVIDER_BASE_URL", DEFAULT_PROVIDER_BASE_URL),
            provider_timeout: Duration::from_secs(parse_var(
                &lookup,
                "RELAY_PROVIDER_TIMEOUT_SECS",
                120,
            )),
            cors_allowed_origins: lookup("RELAY_CORS_ORIGINS").filter(|s| !s.trim().is_empty()),
            enable_docs: lookup("RELAY_ENABLE_DOCS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            log_level: var_or(&lookup, "RELAY_LOG", "info"),
            log_json: lookup("RELAY_LOG_JSON")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn var_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_owned())
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config_with(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:8000");
        assert_eq!(cfg.default_model, DEFAULT_MODEL);
        assert_eq!(cfg.supported_models.len(), SUPPORTED_MODELS.len());
        assert!(cfg.api_key.is_none());
        assert!(cfg.enable_docs);
        assert!(!cfg.log_json);
        assert_eq!(cfg.provider_timeout, Duration::from_secs(120));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert!(config_with(&[("GOOGLE_API_KEY", "   ")]).api_key.is_none());
        let cfg = config_with(&[("GOOGLE_API_KEY", " secret ")]);
        assert_eq!(cfg.api_key.as_ref().map(ApiKey::expose), Some("secret"));
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let cfg = config_with(&[("GOOGLE_API_KEY", "super-secret")]);
        assert!(!format!("{cfg:?}").contains("super-secret"));
    }

    #[test]
    fn custom_default_joins_the_allow_list() {
        let cfg = config_with(&[
            ("RELAY_SUPPORTED_MODELS", "a, b ,,"),
            ("RELAY_DEFAULT_MODEL", "c"),
        ]);
        assert_eq!(cfg.supported_models, vec!["a", "b", "c"]);
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let cfg = config_with(&[("RELAY_PROVIDER_TIMEOUT_SECS", "soon"), ("RELAY_LOG_JSON", "TRUE")]);
        assert_eq!(cfg.provider_timeout, Duration::from_secs(120));
        assert!(cfg.log_json);
    }
}
