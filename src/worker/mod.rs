//! Background replenishment worker: keeps the Track Queue above its
//! refill threshold by pulling search parameters from a rotating set of
//! strategies and fetching/normalizing tracks from the external catalog.

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, CatalogQuery, Normalizer};
use crate::queue::TrackQueue;
use crate::strategies::{StrategyParams, StrategyRotator};

const MAX_CONSECUTIVE_FAILURES: u32 = 5;
const REFILL_MAX_ATTEMPTS: u32 = 3;
const INTER_ATTEMPT_PACE: Duration = Duration::from_secs(2);
const REFILL_THRESHOLD_FRACTION: f64 = 0.7;
const KEYWORD_BUFFER_REFILL_FRACTION: f64 = 0.7;
const CATALOG_REFILL_LIMIT: usize = 500;

/// Worker-wide circuit breaker. Trips after `MAX_CONSECUTIVE_FAILURES`
/// consecutive `attempt_refill` failures and suppresses further refill
/// iterations for `2^min(consecutive_failures - max_failures, 5) * 60s`.
#[derive(Debug, Default, Clone, Copy)]
struct CircuitState {
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
}

impl CircuitState {
    fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.last_failure_at = Some(Instant::now());
    }

    fn backoff_remaining(&self) -> Option<Duration> {
        if self.consecutive_failures < MAX_CONSECUTIVE_FAILURES {
            return None;
        }
        let last_failure_at = self.last_failure_at?;
        let exp = (self.consecutive_failures - MAX_CONSECUTIVE_FAILURES).min(5);
        let backoff = Duration::from_secs(60 * 2u64.pow(exp));
        let elapsed = last_failure_at.elapsed();
        if elapsed < backoff {
            Some(backoff - elapsed)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerStats {
    pub tripped: bool,
    pub consecutive_failures: u32,
    pub keyword_buffer_len: usize,
    pub queue_size: usize,
}

/// State touched only while holding the refill mutex: the keyword buffer,
/// the strategy rotator, and the normalizer's dedupe window. Serialized
/// between the periodic loop and one-shot `trigger_refill` calls.
struct RefillState {
    normalizer: Normalizer,
    rotator: StrategyRotator,
    keyword_buffer: VecDeque<String>,
    keyword_buffer_max: usize,
}

pub struct ReplenishmentWorkerConfig {
    pub min_threshold: usize,
    pub batch_size: usize,
    pub max_cap: usize,
    pub poll_interval: Duration,
    pub keyword_buffer_max: usize,
}

pub struct ReplenishmentWorker {
    queue: std::sync::Arc<TrackQueue>,
    catalog: std::sync::Arc<CatalogClient>,
    min_threshold: usize,
    batch_size: usize,
    max_cap: usize,
    poll_interval: Duration,
    refill: AsyncMutex<RefillState>,
    circuit: StdMutex<CircuitState>,
}

impl ReplenishmentWorker {
    pub fn new(
        queue: std::sync::Arc<TrackQueue>,
        catalog: std::sync::Arc<CatalogClient>,
        rotator: StrategyRotator,
        normalizer: Normalizer,
        config: ReplenishmentWorkerConfig,
    ) -> Self {
        Self {
            queue,
            catalog,
            min_threshold: config.min_threshold,
            batch_size: config.batch_size,
            max_cap: config.max_cap,
            poll_interval: config.poll_interval,
            refill: AsyncMutex::new(RefillState {
                normalizer,
                rotator,
                keyword_buffer: VecDeque::new(),
                keyword_buffer_max: config.keyword_buffer_max,
            }),
            circuit: StdMutex::new(CircuitState::default()),
        }
    }

    pub fn min_threshold(&self) -> usize {
        self.min_threshold
    }

    pub fn stats(&self) -> WorkerStats {
        let circuit = *self.circuit.lock().expect("circuit mutex poisoned");
        let keyword_buffer_len = self
            .refill
            .try_lock()
            .map(|s| s.keyword_buffer.len())
            .unwrap_or(0);
        WorkerStats {
            tripped: circuit.backoff_remaining().is_some(),
            consecutive_failures: circuit.consecutive_failures,
            keyword_buffer_len,
            queue_size: self.queue.size(),
        }
    }

    /// Runs the periodic replenishment loop until `cancel` fires. Completes
    /// its current `attempt_refill` (or abandons it at the next suspension
    /// point via the select below) before exiting.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("replenishment worker loop started");
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let backoff = {
                let circuit = self.circuit.lock().expect("circuit mutex poisoned");
                circuit.backoff_remaining()
            };
            if let Some(backoff) = backoff {
                debug!(backoff_secs = backoff.as_secs(), "circuit tripped, sleeping");
                if Self::sleep_or_cancel(backoff.max(self.poll_interval), &cancel).await {
                    break;
                }
                continue;
            }

            let size = self.queue.size();
            let threshold = (self.max_cap as f64 * REFILL_THRESHOLD_FRACTION) as usize;
            if size >= threshold {
                if Self::sleep_or_cancel(self.poll_interval, &cancel).await {
                    break;
                }
                continue;
            }

            info!(size, threshold, "queue below refill threshold, attempting refill");
            let success = self.attempt_refill().await;
            {
                let mut circuit = self.circuit.lock().expect("circuit mutex poisoned");
                if success {
                    circuit.record_success();
                } else {
                    circuit.record_failure();
                }
            }

            if Self::sleep_or_cancel(self.poll_interval, &cancel).await {
                break;
            }
        }
        info!("replenishment worker loop stopped");
    }

    /// Sleeps for `duration` unless cancelled first. Returns `true` if
    /// cancellation fired.
    async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = cancel.cancelled() => true,
        }
    }

    /// Blocking acquire of the refill mutex, used by the periodic loop.
    pub async fn attempt_refill(&self) -> bool {
        let mut state = self.refill.lock().await;
        self.run_refill(&mut state).await
    }

    /// Non-blocking one-shot refill. If the mutex is already held by the
    /// periodic loop (or another one-shot call), returns `false`
    /// immediately without running anything.
    pub async fn trigger_refill(&self) -> bool {
        match self.refill.try_lock() {
            Ok(mut state) => self.run_refill(&mut state).await,
            Err(_) => {
                debug!("refill already in progress, skipping one-shot trigger");
                false
            }
        }
    }

    async fn run_refill(&self, state: &mut RefillState) -> bool {
        let size = self.queue.size();
        let need = self.batch_size.min(self.max_cap.saturating_sub(size));
        if need == 0 {
            return true;
        }

        let mut filled = 0usize;
        let mut attempts = 0u32;

        while filled < need && attempts < REFILL_MAX_ATTEMPTS {
            let low_water = (state.keyword_buffer_max as f64 * KEYWORD_BUFFER_REFILL_FRACTION) as usize;
            if state.keyword_buffer.len() <= low_water {
                match state.rotator.next_params().await {
                    Some(StrategyParams::Term { term, .. }) => state.keyword_buffer.push_back(term),
                    Some(StrategyParams::Terms { terms, .. }) => state.keyword_buffer.extend(terms),
                    None => {
                        attempts += 1;
                        continue;
                    }
                }
            }

            if state.keyword_buffer.is_empty() {
                attempts += 1;
                continue;
            }

            let term = state.keyword_buffer.pop_front().expect("checked non-empty above");
            let query = CatalogQuery {
                term,
                entity: None,
                attribute: None,
            };

            match self.catalog.search(&query, CATALOG_REFILL_LIMIT).await {
                Ok(records) => {
                    let tracks = state.normalizer.normalize_batch(records);
                    let remaining = need - filled;
                    let accepted_tracks: Vec<_> = tracks.into_iter().take(remaining).collect();
                    let accepted = self.queue.enqueue(accepted_tracks);
                    filled += accepted;
                }
                Err(err) => {
                    warn!(error = %err, "catalog search failed during refill");
                }
            }

            attempts += 1;
            if filled < need {
                tokio::time::sleep(INTER_ATTEMPT_PACE).await;
            }
        }

        filled > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_trips_after_max_consecutive_failures() {
        let mut circuit = CircuitState::default();
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            circuit.record_failure();
        }
        assert!(circuit.backoff_remaining().is_some());
    }

    #[test]
    fn circuit_does_not_trip_below_threshold() {
        let mut circuit = CircuitState::default();
        for _ in 0..(MAX_CONSECUTIVE_FAILURES - 1) {
            circuit.record_failure();
        }
        assert!(circuit.backoff_remaining().is_none());
    }

    #[test]
    fn success_resets_circuit() {
        let mut circuit = CircuitState::default();
        for _ in 0..MAX_CONSECUTIVE_FAILURES {
            circuit.record_failure();
        }
        circuit.record_success();
        assert_eq!(circuit.consecutive_failures, 0);
        assert!(circuit.backoff_remaining().is_none());
    }
}
