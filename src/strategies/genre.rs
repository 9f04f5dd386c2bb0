use async_trait::async_trait;
use rand::prelude::IndexedRandom;

use crate::errors::{AppError, AppResult};
use crate::strategies::{SearchStrategy, StrategyParams};

/// Picks one configured genre term, constrained to the genre index facet.
pub struct GenreSearchStrategy {
    genres: Vec<String>,
}

impl GenreSearchStrategy {
    pub fn new(genres: Vec<String>) -> Self {
        Self { genres }
    }
}

#[async_trait]
impl SearchStrategy for GenreSearchStrategy {
    fn name(&self) -> &'static str {
        "genre_search"
    }

    async fn generate_params(&mut self) -> AppResult<StrategyParams> {
        let term = self
            .genres
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| AppError::empty_result("genre list is empty"))?;
        Ok(StrategyParams::Term {
            term,
            entity: Some("song".to_string()),
            attribute: Some("genreIndex".to_string()),
        })
    }
}
