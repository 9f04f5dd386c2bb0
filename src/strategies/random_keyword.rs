use async_trait::async_trait;
use rand::prelude::IndexedRandom;

use crate::errors::{AppError, AppResult};
use crate::strategies::{SearchStrategy, StrategyParams};

/// Returns one uniformly-chosen term from a static configured list.
pub struct RandomKeywordStrategy {
    terms: Vec<String>,
}

impl RandomKeywordStrategy {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }
}

#[async_trait]
impl SearchStrategy for RandomKeywordStrategy {
    fn name(&self) -> &'static str {
        "random_keyword"
    }

    async fn generate_params(&mut self) -> AppResult<StrategyParams> {
        let term = self
            .terms
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| AppError::empty_result("random keyword list is empty"))?;
        Ok(StrategyParams::Term {
            term,
            entity: None,
            attribute: None,
        })
    }
}
