use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{AppError, FetchError};
use crate::strategies::{SearchStrategy, StrategyParams};

/// Per-strategy failure bookkeeping. `failures` resets on any success; it is
/// forced to `2` on quota-class errors to impose a longer cooldown than a
/// single ordinary failure would.
#[derive(Debug, Clone, Default)]
struct StrategyFailureInfo {
    failures: u32,
    last_failure_at: Option<Instant>,
}

impl StrategyFailureInfo {
    fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let last_failure_at = self.last_failure_at?;
        if self.failures == 0 {
            return None;
        }
        let cooldown = Duration::from_secs(60 * 2u64.pow(self.failures.min(5)));
        let elapsed = now.saturating_duration_since(last_failure_at);
        if elapsed < cooldown {
            Some(cooldown - elapsed)
        } else {
            None
        }
    }
}

/// Selects a strategy that is not in cooldown, invokes it, and on failure
/// records and rotates to the next one. Owned exclusively by the
/// Replenishment Worker; never mutated concurrently.
pub struct StrategyRotator {
    strategies: Vec<(String, Box<dyn SearchStrategy>)>,
    idx: usize,
    failures: HashMap<String, StrategyFailureInfo>,
}

impl StrategyRotator {
    pub fn new(strategies: Vec<(String, Box<dyn SearchStrategy>)>) -> Self {
        Self {
            strategies,
            idx: 0,
            failures: HashMap::new(),
        }
    }

    /// Iterates strategies in round-robin order, skipping those in cooldown,
    /// up to `|strategies|` times, returning the first validated success.
    pub async fn next_params(&mut self) -> Option<StrategyParams> {
        let attempts = self.strategies.len();
        if attempts == 0 {
            return None;
        }

        for _ in 0..attempts {
            let idx = self.idx;
            let name = self.strategies[idx].0.clone();
            self.idx = (self.idx + 1) % attempts;

            let in_cooldown = self
                .failures
                .get(&name)
                .and_then(|info| info.cooldown_remaining(Instant::now()))
                .inspect(|remaining| {
                    debug!(strategy = %name, remaining_secs = remaining.as_secs(), "strategy in cooldown, skipping");
                })
                .is_some();
            if in_cooldown {
                continue;
            }

            let result = self.strategies[idx].1.generate_params().await;

            match result {
                Ok(params) => match params.normalize() {
                    Some(params) => {
                        self.failures.entry(name).or_default().failures = 0;
                        return Some(params);
                    }
                    None => {
                        self.record_failure(&name, false);
                    }
                },
                Err(err) => {
                    let is_quota = matches!(&err, AppError::Fetch(FetchError::Quota { .. }));
                    warn!(strategy = %name, error = %err, "strategy invocation failed");
                    self.record_failure(&name, is_quota);
                }
            }
        }

        None
    }

    fn record_failure(&mut self, name: &str, is_quota: bool) {
        let info = self.failures.entry(name.to_string()).or_default();
        info.failures = if is_quota { 2 } else { info.failures + 1 };
        info.last_failure_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FailThenSucceed {
        calls: Arc<AtomicUsize>,
        fail_times: usize,
        quota: bool,
    }

    #[async_trait]
    impl SearchStrategy for FailThenSucceed {
        fn name(&self) -> &'static str {
            "fail_then_succeed"
        }

        async fn generate_params(&mut self) -> crate::errors::AppResult<StrategyParams> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                if self.quota {
                    return Err(FetchError::Quota {
                        message: "quota exceeded".to_string(),
                    }
                    .into());
                }
                return Err(FetchError::Transient {
                    message: "boom".to_string(),
                }
                .into());
            }
            Ok(StrategyParams::Term {
                term: "ok".to_string(),
                entity: None,
                attribute: None,
            })
        }
    }

    struct AlwaysSucceed;

    #[async_trait]
    impl SearchStrategy for AlwaysSucceed {
        fn name(&self) -> &'static str {
            "always_succeed"
        }

        async fn generate_params(&mut self) -> crate::errors::AppResult<StrategyParams> {
            Ok(StrategyParams::Term {
                term: "b".to_string(),
                entity: None,
                attribute: None,
            })
        }
    }

    #[tokio::test]
    async fn quota_failure_forces_longer_cooldown_than_one_rotation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let a: Box<dyn SearchStrategy> = Box::new(FailThenSucceed {
            calls: calls.clone(),
            fail_times: usize::MAX,
            quota: true,
        });
        let b: Box<dyn SearchStrategy> = Box::new(AlwaysSucceed);

        let mut rotator = StrategyRotator::new(vec![("a".to_string(), a), ("b".to_string(), b)]);

        let params = rotator.next_params().await;
        assert!(matches!(params, Some(StrategyParams::Term { ref term, .. }) if term == "b"));

        let a_info = rotator.failures.get("a").unwrap();
        assert_eq!(a_info.failures, 2);
        assert!(a_info.last_failure_at.is_some());
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let calls = Arc::new(AtomicUsize::new(0));
        let a: Box<dyn SearchStrategy> = Box::new(FailThenSucceed {
            calls: calls.clone(),
            fail_times: 1,
            quota: false,
        });
        let mut rotator = StrategyRotator::new(vec![("a".to_string(), a)]);

        // First call fails (ordinary), rotates back to itself on next round.
        assert!(rotator.next_params().await.is_none());
        assert_eq!(rotator.failures.get("a").unwrap().failures, 1);

        // Cooldown for failures=1 is 2^1*60s = 120s, so it's still skipped
        // immediately after — simulate past cooldown by clearing state.
        rotator.failures.get_mut("a").unwrap().last_failure_at = None;
        let params = rotator.next_params().await;
        assert!(params.is_some());
        assert_eq!(rotator.failures.get("a").unwrap().failures, 0);
    }
}
