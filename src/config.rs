//! Application configuration loaded from environment variables.
//!
//! API keys are optional: a missing INSEE key disables catalog loading
//! and a missing LLM key turns chat answers into an error message.

use std::env;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,

    // --- Upstream base URLs (overridable for tests and mirrors) ---
    pub insee_base_url: String,
    pub geo_api_base_url: String,
    pub nominatim_base_url: String,
    pub static_boundaries_base_url: String,
    pub llm_base_url: String,

    // --- Secrets ---
    /// Bearer token for api.insee.fr
    pub insee_api_key: Option<String>,
    /// Key for the generative language model endpoint
    pub llm_api_key: Option<String>,
    pub llm_model: String,

    // --- Behaviour ---
    /// Maximum number of search results returned
    pub search_limit: usize,
    /// Entries kept per cache before the oldest is evicted
    pub cache_capacity: usize,
    /// Sessions kept before the oldest is evicted
    pub max_sessions: usize,
    /// Nominatim requires an identifying User-Agent
    pub nominatim_user_agent: String,
    pub timeouts: Timeouts,
}

/// Per-upstream request timeouts.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub metadata: Duration,
    pub geo_api: Duration,
    pub nominatim: Duration,
    pub stats: Duration,
    pub llm: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            metadata: Duration::from_secs(15),
            geo_api: Duration::from_secs(5),
            nominatim: Duration::from_secs(10),
            stats: Duration::from_secs(10),
            llm: Duration::from_secs(30),
        }
    }
}

pub const MAX_SEARCH_LIMIT: usize = 100;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let search_limit = parse_var("SEARCH_LIMIT", 20usize)?;
        if search_limit == 0 || search_limit > MAX_SEARCH_LIMIT {
            return Err(ConfigError::Invalid(
                "SEARCH_LIMIT",
                format!("must be between 1 and {}", MAX_SEARCH_LIMIT),
            ));
        }

        Ok(Self {
            port: parse_var("PORT", 8080u16)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            insee_base_url: base_url("INSEE_BASE_URL", "https://api.insee.fr"),
            geo_api_base_url: base_url("GEO_API_BASE_URL", "https://geo.api.gouv.fr"),
            nominatim_base_url: base_url(
                "NOMINATIM_BASE_URL",
                "https://nominatim.openstreetmap.org",
            ),
            static_boundaries_base_url: base_url(
                "STATIC_BOUNDARIES_BASE_URL",
                "https://raw.githubusercontent.com/gregoiredavid/france-geojson/master",
            ),
            llm_base_url: base_url(
                "LLM_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),

            insee_api_key: secret("INSEE_API_KEY"),
            llm_api_key: secret("LLM_API_KEY"),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),

            search_limit,
            cache_capacity: parse_var("CACHE_CAPACITY", 256usize)?,
            max_sessions: parse_var("MAX_SESSIONS", 10_000usize)?,
            nominatim_user_agent: env::var("NOMINATIM_USER_AGENT")
                .unwrap_or_else(|_| "insee-geo-finder/0.1".to_string()),
            timeouts: Timeouts::default(),
        })
    }

    /// Config for tests: every upstream points at `upstream` and both keys are set.
    pub fn test_default() -> Self {
        Self::for_upstream("http://127.0.0.1:9")
    }

    /// Same as [`Config::test_default`] with all upstreams at one base URL.
    pub fn for_upstream(upstream: &str) -> Self {
        let upstream = upstream.trim_end_matches('/').to_string();
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            insee_base_url: upstream.clone(),
            geo_api_base_url: format!("{}/geo", upstream),
            nominatim_base_url: format!("{}/nominatim", upstream),
            static_boundaries_base_url: format!("{}/static", upstream),
            llm_base_url: format!("{}/llm", upstream),
            insee_api_key: Some("test_insee_key".to_string()),
            llm_api_key: Some("test_llm_key".to_string()),
            llm_model: "test-model".to_string(),
            search_limit: 20,
            cache_capacity: 64,
            max_sessions: 100,
            nominatim_user_agent: "insee-geo-finder-tests".to_string(),
            timeouts: Timeouts {
                metadata: Duration::from_secs(2),
                geo_api: Duration::from_secs(2),
                nominatim: Duration::from_secs(2),
                stats: Duration::from_secs(2),
                llm: Duration::from_secs(2),
            },
        }
    }
}

/// Read a secret, treating empty values as absent.
fn secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_url(name: &str, default: &str) -> String {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, format!("cannot parse {:?}", raw))),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
