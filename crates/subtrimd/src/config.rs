//! Configuration for subtrimd.
//!
//! Loads settings from an optional TOML file, then applies environment
//! overrides. Required credentials are checked at call time, not at startup:
//! a missing key yields a 500 on the route that needs it, never a crash.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/subtrim/config.toml";

/// Completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-style chat-completions base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API credential; absence is a per-call misconfiguration error
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected token audience (the identity provider client id); absence
    /// makes gated routes fail with a misconfiguration error
    #[serde(default)]
    pub idp_client_id: Option<String>,

    /// Token verification endpoint
    #[serde(default = "default_tokeninfo_endpoint")]
    pub tokeninfo_endpoint: String,
}

fn default_tokeninfo_endpoint() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Price suggestion cache TTL
    #[serde(default = "default_price_cache_ttl")]
    pub price_cache_ttl_secs: u64,

    /// Price suggestion cache capacity (LRU-bounded key space)
    #[serde(default = "default_price_cache_capacity")]
    pub price_cache_capacity: usize,
}

fn default_port() -> u16 {
    8787
}

fn default_price_cache_ttl() -> u64 {
    24 * 60 * 60
}

fn default_price_cache_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            llm: LlmConfig::default(),
            auth: AuthConfig::default(),
            price_cache_ttl_secs: default_price_cache_ttl(),
            price_cache_capacity: default_price_cache_capacity(),
        }
    }
}

impl Config {
    /// Load from the default path with environment overrides applied.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load from a specific path; missing or unparseable files fall back to
    /// defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::from_file(path);
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    fn from_file(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Environment variables take precedence over file values. Variables set
    /// to the empty string count as unset.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(port) = var("SUBTRIM_PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }
        if let Some(key) = var("SUBTRIM_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = var("SUBTRIM_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(endpoint) = var("SUBTRIM_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Some(client_id) = var("SUBTRIM_IDP_CLIENT_ID") {
            self.auth.idp_client_id = Some(client_id);
        }
    }
}
