use async_trait::async_trait;
use rand::prelude::IndexedRandom;

use crate::errors::{AppError, AppResult};
use crate::strategies::{SearchStrategy, StrategyParams};

/// Picks one configured release year, constrained to the release-year facet.
pub struct ReleaseYearSearchStrategy {
    years: Vec<String>,
}

impl ReleaseYearSearchStrategy {
    pub fn new(years: Vec<String>) -> Self {
        Self { years }
    }
}

#[async_trait]
impl SearchStrategy for ReleaseYearSearchStrategy {
    fn name(&self) -> &'static str {
        "release_year_search"
    }

    async fn generate_params(&mut self) -> AppResult<StrategyParams> {
        let term = self
            .years
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| AppError::empty_result("release year list is empty"))?;
        Ok(StrategyParams::Term {
            term,
            entity: Some("song".to_string()),
            attribute: Some("releaseYearTerm".to_string()),
        })
    }
}
