use async_trait::async_trait;
use rand::prelude::IndexedRandom;

use crate::errors::{AppError, AppResult};
use crate::strategies::{SearchStrategy, StrategyParams};

/// Picks one configured artist name, searching specifically for tracks.
pub struct ArtistSearchStrategy {
    artists: Vec<String>,
}

impl ArtistSearchStrategy {
    pub fn new(artists: Vec<String>) -> Self {
        Self { artists }
    }
}

#[async_trait]
impl SearchStrategy for ArtistSearchStrategy {
    fn name(&self) -> &'static str {
        "artist_search"
    }

    async fn generate_params(&mut self) -> AppResult<StrategyParams> {
        let term = self
            .artists
            .choose(&mut rand::rng())
            .cloned()
            .ok_or_else(|| AppError::empty_result("artist list is empty"))?;
        Ok(StrategyParams::Term {
            term,
            entity: Some("musicTrack".to_string()),
            attribute: None,
        })
    }
}
