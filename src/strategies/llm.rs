use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult, FetchError};
use crate::strategies::{SearchStrategy, StrategyParams};

const GEMINI_ENDPOINT_TEMPLATE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

/// Invokes an external text-generation service with a fixed prompt and
/// parses the comma-separated keyword response (accepting both ASCII and
/// full-width commas). Rate-limited to one call per `min_interval`.
pub struct LlmKeywordStrategy {
    client: reqwest::Client,
    config: LlmConfig,
    last_call: Option<Instant>,
}

impl LlmKeywordStrategy {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            last_call: None,
        }
    }

    async fn wait_for_rate_limit(&mut self) {
        let min_interval = Duration::from_millis(self.config.min_interval_ms);
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

#[async_trait]
impl SearchStrategy for LlmKeywordStrategy {
    fn name(&self) -> &'static str {
        "llm_keyword"
    }

    async fn generate_params(&mut self) -> AppResult<StrategyParams> {
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or_else(|| AppError::configuration("OTODOKI_LLM_API_KEY is not set"))?;

        self.wait_for_rate_limit().await;

        let url = GEMINI_ENDPOINT_TEMPLATE.replace("{model}", &self.config.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": self.config.prompt_template }] }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "topP": self.config.top_p,
                "topK": self.config.top_k,
                "maxOutputTokens": self.config.max_tokens,
            }
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Transient {
                message: format!("llm request failed: {e}"),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::Quota {
                message: "llm provider returned 429".to_string(),
            }
            .into());
        }
        if status.is_client_error() {
            let message = resp.text().await.unwrap_or_default();
            if FetchError::is_quota(&message) {
                return Err(FetchError::Quota { message }.into());
            }
            return Err(FetchError::Permanent {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        if status.is_server_error() {
            return Err(FetchError::Transient {
                message: format!("llm provider returned {status}"),
            }
            .into());
        }

        let payload: serde_json::Value = resp.json().await.map_err(|e| FetchError::Transient {
            message: format!("decoding llm response: {e}"),
        })?;

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();

        info!(response = %text, "llm keyword response received");

        let terms: Vec<String> = text
            .replace('、', ",")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(StrategyParams::Terms {
            terms,
            entity: None,
            attribute: None,
        })
    }
}
