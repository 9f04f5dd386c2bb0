//! Pluggable producers of catalog search parameters, rotated by the
//! [`StrategyRotator`] with per-strategy failure isolation and cooldown.

pub mod artist;
pub mod chart;
pub mod genre;
pub mod llm;
pub mod random_keyword;
pub mod release_year;
pub mod rotator;

pub use rotator::StrategyRotator;

use async_trait::async_trait;

use crate::errors::AppResult;

/// Parameters a strategy hands back for the Catalog Client to forward.
/// Either a single `term`, or `terms`, both optionally carrying `entity`/
/// `attribute` hints the iTunes search API understands.
#[derive(Debug, Clone)]
pub enum StrategyParams {
    Term {
        term: String,
        entity: Option<String>,
        attribute: Option<String>,
    },
    Terms {
        terms: Vec<String>,
        entity: Option<String>,
        attribute: Option<String>,
    },
}

impl StrategyParams {
    /// Trims `term`/`terms`, drops empties, and returns `None` if nothing
    /// usable remains — the validation step the Rotator applies to every
    /// strategy result before accepting it.
    pub fn normalize(self) -> Option<Self> {
        match self {
            StrategyParams::Term { term, entity, attribute } => {
                let trimmed = term.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(StrategyParams::Term {
                        term: trimmed,
                        entity,
                        attribute,
                    })
                }
            }
            StrategyParams::Terms { terms, entity, attribute } => {
                let trimmed: Vec<String> = terms
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(StrategyParams::Terms {
                        terms: trimmed,
                        entity,
                        attribute,
                    })
                }
            }
        }
    }
}

/// A uniform interface for producing catalog search parameters.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate_params(&mut self) -> AppResult<StrategyParams>;
}
