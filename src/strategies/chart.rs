use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogClient;
use crate::errors::AppResult;
use crate::strategies::{SearchStrategy, StrategyParams};

/// Fetches the country popularity feed and extracts `artistName`/`name`
/// tokens in order of appearance, deduplicated, as a batch of search terms.
pub struct ChartKeywordStrategy {
    catalog: Arc<CatalogClient>,
    country: String,
    limit: usize,
}

impl ChartKeywordStrategy {
    pub fn new(catalog: Arc<CatalogClient>, country: String, limit: usize) -> Self {
        Self {
            catalog,
            country,
            limit,
        }
    }
}

#[async_trait]
impl SearchStrategy for ChartKeywordStrategy {
    fn name(&self) -> &'static str {
        "chart_keyword"
    }

    async fn generate_params(&mut self) -> AppResult<StrategyParams> {
        let pairs = self.catalog.fetch_chart_feed(&self.country, self.limit).await?;

        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for (artist, title) in pairs {
            for token in [artist, title] {
                let trimmed = token.trim().to_string();
                if !trimmed.is_empty() && seen.insert(trimmed.clone()) {
                    terms.push(trimmed);
                }
            }
        }

        Ok(StrategyParams::Terms {
            terms,
            entity: None,
            attribute: None,
        })
    }
}
