//! Configuration surface for the candidate supply pipeline.
//!
//! Loaded once at startup via `figment`: an optional TOML file layered
//! under bare (unprefixed) environment variables, matching the variable
//! names the service has always recognized. Missing or unparsable values
//! fall back to the defaults below rather than failing startup.

use anyhow::Result;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub otodoki: OtodokiConfig,
    #[serde(default)]
    pub search: SearchStrategyConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            queue: QueueConfig::default(),
            otodoki: OtodokiConfig::default(),
            search: SearchStrategyConfig::default(),
            suggestions: SuggestionsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `QUEUE_MAX_CAPACITY`, `QUEUE_DEQUEUE_DEFAULT_N`, `QUEUE_LOW_WATERMARK`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_queue_max_capacity")]
    pub max_capacity: usize,
    #[serde(default = "default_queue_dequeue_default_n")]
    pub dequeue_default_n: usize,
    #[serde(default = "default_queue_low_watermark")]
    pub low_watermark: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_queue_max_capacity(),
            dequeue_default_n: default_queue_dequeue_default_n(),
            low_watermark: default_queue_low_watermark(),
        }
    }
}

/// `OTODOKI_MIN_THRESHOLD`, `OTODOKI_BATCH_SIZE`, `OTODOKI_MAX_CAP`,
/// `OTODOKI_POLL_INTERVAL_MS`, `OTODOKI_HTTP_TIMEOUT_S`, `OTODOKI_RETRY_MAX`,
/// `OTODOKI_COUNTRY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtodokiConfig {
    #[serde(default = "default_min_threshold")]
    pub min_threshold: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_cap")]
    pub max_cap: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_http_timeout_s")]
    pub http_timeout_s: f64,
    #[serde(default = "default_retry_max")]
    pub retry_max: u32,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for OtodokiConfig {
    fn default() -> Self {
        Self {
            min_threshold: default_min_threshold(),
            batch_size: default_batch_size(),
            max_cap: default_max_cap(),
            poll_interval_ms: default_poll_interval_ms(),
            http_timeout_s: default_http_timeout_s(),
            retry_max: default_retry_max(),
            country: default_country(),
            lang: default_lang(),
        }
    }
}

/// `OTODOKI_SEARCH_STRATEGY`, `OTODOKI_ITUNES_TERMS`, `OTODOKI_SEARCH_GENRES`,
/// `OTODOKI_SEARCH_YEARS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStrategyConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_itunes_terms", deserialize_with = "comma_separated")]
    pub itunes_terms: Vec<String>,
    #[serde(default = "default_search_genres", deserialize_with = "comma_separated")]
    pub search_genres: Vec<String>,
    #[serde(default = "default_search_years", deserialize_with = "comma_separated")]
    pub search_years: Vec<String>,
}

impl Default for SearchStrategyConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            itunes_terms: default_itunes_terms(),
            search_genres: default_search_genres(),
            search_years: default_search_years(),
        }
    }
}

/// `OTODOKI_SUGGESTIONS_DEFAULT_LIMIT`, `OTODOKI_SUGGESTIONS_MAX_LIMIT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    #[serde(default = "default_suggestions_limit")]
    pub default_limit: usize,
    #[serde(default = "default_suggestions_max_limit")]
    pub max_limit: usize,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_suggestions_limit(),
            max_limit: default_suggestions_max_limit(),
        }
    }
}

/// `OTODOKI_RATE_LIMIT_PER_SEC`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_per_sec")]
    pub per_sec: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_sec: default_rate_limit_per_sec(),
        }
    }
}

/// LLM keyword-strategy settings: API key, model, sampling parameters, prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f64,
    #[serde(default = "default_llm_top_p")]
    pub top_p: f64,
    #[serde(default = "default_llm_top_k")]
    pub top_k: u32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_prompt_template")]
    pub prompt_template: String,
    #[serde(default = "default_llm_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            top_p: default_llm_top_p(),
            top_k: default_llm_top_k(),
            max_tokens: default_llm_max_tokens(),
            prompt_template: default_llm_prompt_template(),
            min_interval_ms: default_llm_min_interval_ms(),
        }
    }
}

/// Accepts either a JSON/TOML array or a comma-separated string, matching
/// the `OTODOKI_ITUNES_TERMS`-style env vars which arrive as plain strings.
fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
    }

    match StringOrVec::deserialize(deserializer)? {
        StringOrVec::Vec(v) => Ok(v),
        StringOrVec::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

/// Reads an environment variable and parses it, falling back to `default`
/// (rather than failing startup) if the variable is absent or unparsable.
/// Mirrors the `os.getenv(..., default)` + `try/except ValueError` pattern
/// the original service used for every setting.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list_or(key: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => {
            let parsed: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if parsed.is_empty() { default } else { parsed }
        }
        Err(_) => default,
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Loads the optional TOML file (providing structured overrides for
    /// deployments that prefer a file), then applies the flat environment
    /// variables named in the specification on top — these always win, since
    /// they are the primary configuration surface.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let mut config: Config = if std::path::Path::new(config_file).exists() {
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::file(config_file))
                .extract()?
        } else {
            tracing::warn!(
                "config file '{}' not found, using defaults and environment",
                config_file
            );
            Self::default()
        };

        config.web.host = std::env::var("HOST").unwrap_or(config.web.host);
        config.web.port = env_or("PORT", config.web.port);

        config.queue.max_capacity = env_or("QUEUE_MAX_CAPACITY", config.queue.max_capacity).max(1);
        config.queue.dequeue_default_n =
            env_or("QUEUE_DEQUEUE_DEFAULT_N", config.queue.dequeue_default_n).max(1);
        config.queue.low_watermark = env_or("QUEUE_LOW_WATERMARK", config.queue.low_watermark);

        config.otodoki.min_threshold =
            env_or("OTODOKI_MIN_THRESHOLD", config.otodoki.min_threshold).max(1);
        config.otodoki.batch_size = env_or("OTODOKI_BATCH_SIZE", config.otodoki.batch_size).max(1);
        config.otodoki.max_cap = env_or("OTODOKI_MAX_CAP", config.otodoki.max_cap).max(1);
        config.otodoki.poll_interval_ms =
            env_or("OTODOKI_POLL_INTERVAL_MS", config.otodoki.poll_interval_ms).max(100);
        config.otodoki.http_timeout_s =
            env_or("OTODOKI_HTTP_TIMEOUT_S", config.otodoki.http_timeout_s);
        config.otodoki.retry_max = env_or("OTODOKI_RETRY_MAX", config.otodoki.retry_max);
        config.otodoki.country = std::env::var("OTODOKI_COUNTRY").unwrap_or(config.otodoki.country);

        config.search.strategy =
            std::env::var("OTODOKI_SEARCH_STRATEGY").unwrap_or(config.search.strategy);
        config.search.itunes_terms =
            env_list_or("OTODOKI_ITUNES_TERMS", config.search.itunes_terms);
        config.search.search_genres =
            env_list_or("OTODOKI_SEARCH_GENRES", config.search.search_genres);
        config.search.search_years =
            env_list_or("OTODOKI_SEARCH_YEARS", config.search.search_years);

        config.suggestions.default_limit = env_or(
            "OTODOKI_SUGGESTIONS_DEFAULT_LIMIT",
            config.suggestions.default_limit,
        );
        config.suggestions.max_limit = env_or(
            "OTODOKI_SUGGESTIONS_MAX_LIMIT",
            config.suggestions.max_limit,
        );

        config.rate_limit.per_sec =
            env_or("OTODOKI_RATE_LIMIT_PER_SEC", config.rate_limit.per_sec);

        config.llm.api_key = std::env::var("OTODOKI_LLM_API_KEY")
            .ok()
            .or(config.llm.api_key);
        config.llm.model = std::env::var("OTODOKI_LLM_MODEL").unwrap_or(config.llm.model);
        config.llm.temperature = env_or("OTODOKI_LLM_TEMPERATURE", config.llm.temperature);
        config.llm.top_p = env_or("OTODOKI_LLM_TOP_P", config.llm.top_p);
        config.llm.top_k = env_or("OTODOKI_LLM_TOP_K", config.llm.top_k);
        config.llm.max_tokens = env_or("OTODOKI_LLM_MAX_TOKENS", config.llm.max_tokens);
        config.llm.prompt_template =
            std::env::var("OTODOKI_LLM_PROMPT_TEMPLATE").unwrap_or(config.llm.prompt_template);
        config.llm.min_interval_ms =
            env_or("OTODOKI_LLM_MIN_INTERVAL_MS", config.llm.min_interval_ms);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_specification() {
        let config = Config::default();
        assert_eq!(config.queue.max_capacity, 1000);
        assert_eq!(config.queue.low_watermark, 100);
        assert_eq!(config.otodoki.min_threshold, 30);
        assert_eq!(config.otodoki.max_cap, 300);
        assert_eq!(config.suggestions.max_limit, 50);
        assert_eq!(config.rate_limit.per_sec, 20);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let config = Config::load_from_file("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.queue.max_capacity, default_queue_max_capacity());
    }
}
