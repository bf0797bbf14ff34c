// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration management for auditbot
//!
//! Loaded from a TOML file layered with `AUDITBOT__SECTION__KEY`
//! environment variables. A missing file yields the defaults.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::audit::DEFAULT_MAX_DEPTH;
use crate::error::Result;
use crate::issue::WcagLevel;
use crate::store::models::TeamConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rule-check defaults
    #[serde(default)]
    pub audit: AuditConfig,

    /// Text-analysis endpoint
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Design-system catalog fetching
    #[serde(default)]
    pub design_system: DesignSystemConfig,

    /// Team configurations keyed by team id
    #[serde(default)]
    pub teams: HashMap<String, TeamConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// Level used when neither the request nor the team picks one
    #[serde(default)]
    pub default_level: WcagLevel,

    /// Deepest tree level audited (root = 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_level: WcagLevel::default(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Chat completions endpoint
    #[serde(default = "default_analysis_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Inline API key; prefer `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Request timeout (seconds)
    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_analysis_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_analysis_timeout(),
        }
    }
}

fn default_analysis_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f64 {
    0.7
}

fn default_analysis_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct DesignSystemConfig {
    /// How long a fetched catalog stays fresh (seconds)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Catalog fetch timeout (seconds)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DesignSystemConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Figma-Design-System-Audit/1.0".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let builder = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("AUDITBOT").separator("__"));

        let config = builder.build()?;
        let parsed: Config = config.try_deserialize()?;

        Ok(parsed)
    }
}
