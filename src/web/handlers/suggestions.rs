use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::suggestions::SuggestionsResponse;
use crate::web::responses::ApiError;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub limit: Option<usize>,
    pub exclude: Option<String>,
}

pub async fn get_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    if !state.rate_limiter.is_allowed() {
        let retry_after_ms = state.rate_limiter.retry_after().as_millis() as u64;
        return Err(AppError::RateLimited { retry_after_ms }.into());
    }

    let limit = query.limit.unwrap_or(10);
    let exclude_ids = query
        .exclude
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let response = state.suggestions.get_suggestions(limit, exclude_ids).await;
    Ok(Json(response))
}
