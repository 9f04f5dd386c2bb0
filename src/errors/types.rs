//! Error type definitions for the candidate supply pipeline.
//!
//! The taxonomy mirrors the failure modes an operator actually needs to
//! distinguish: transient vs. permanent upstream failures, quota exhaustion,
//! empty results, malformed client input, and local invariant violations.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Failure fetching from an external HTTP source (catalog, chart feed, LLM).
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A strategy or the catalog produced zero usable results.
    #[error("empty result: {context}")]
    EmptyResult { context: String },

    /// An upstream record was missing required fields and was dropped.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// Malformed client input, already normalized by the caller.
    #[error("invalid client input: {message}")]
    ClientInput { message: String },

    /// The global rate limiter rejected a request.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Configuration could not be resolved into a usable value.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Catch-all for conditions that should not be reachable in normal operation.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Failure fetching from an external HTTP endpoint.
///
/// Distinguishes retryable transport/5xx failures from permanent 4xx
/// rejections and quota exhaustion, which needs a longer, distinct cooldown.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Connection timeout or 5xx; caller may retry with backoff.
    #[error("transient fetch failure: {message}")]
    Transient { message: String },

    /// 4xx response; not retryable.
    #[error("permanent fetch failure ({status}): {message}")]
    Permanent { status: u16, message: String },

    /// 429 or a quota/rate message from the upstream; forces a longer cooldown.
    #[error("quota exceeded: {message}")]
    Quota { message: String },
}

impl FetchError {
    /// True if the failure message/status indicates quota exhaustion,
    /// per the `"429"` / `"quota"` substring rule.
    pub fn is_quota(message: &str) -> bool {
        let lower = message.to_lowercase();
        lower.contains("429") || lower.contains("quota")
    }
}

impl AppError {
    pub fn empty_result<S: Into<String>>(context: S) -> Self {
        Self::EmptyResult {
            context: context.into(),
        }
    }

    pub fn invariant_violation<S: Into<String>>(message: S) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn client_input<S: Into<String>>(message: S) -> Self {
        Self::ClientInput {
            message: message.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
