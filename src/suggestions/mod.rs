//! Request-scoped candidate delivery: drains the Track Queue in bounded
//! batches, applies per-request exclusion, and re-enqueues the remainder.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::models::Track;
use crate::queue::TrackQueue;
use crate::worker::ReplenishmentWorker;

const DEQUEUE_LOOKAHEAD: usize = 5;
const MAX_TOTAL_DEQUEUE_MULTIPLIER: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsMeta {
    pub requested: usize,
    pub delivered: usize,
    pub queue_size_after: usize,
    pub refill_triggered: bool,
    pub ts: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsResponse {
    pub data: Vec<Track>,
    pub meta: SuggestionsMeta,
}

pub struct SuggestionsService {
    queue: Arc<TrackQueue>,
    worker: Option<Arc<ReplenishmentWorker>>,
    max_limit: usize,
}

impl SuggestionsService {
    pub fn new(queue: Arc<TrackQueue>, worker: Option<Arc<ReplenishmentWorker>>, max_limit: usize) -> Self {
        Self { queue, worker, max_limit }
    }

    /// Normalizes `limit`/`exclude_ids`, drains the queue until `limit`
    /// items are delivered or the dequeue budget is exhausted, re-enqueues
    /// everything not delivered, and conditionally schedules a one-shot
    /// worker refill.
    pub async fn get_suggestions(&self, limit: usize, exclude_ids: Vec<String>) -> SuggestionsResponse {
        let limit = limit.clamp(1, self.max_limit);
        let exclude: HashSet<String> = exclude_ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let max_total_dequeue = MAX_TOTAL_DEQUEUE_MULTIPLIER * limit;
        let mut delivered: Vec<Track> = Vec::new();
        let mut unused: Vec<Track> = Vec::new();
        let mut total_dequeued = 0usize;

        while delivered.len() < limit && total_dequeued < max_total_dequeue {
            let need = limit - delivered.len();
            let remaining_budget = max_total_dequeue - total_dequeued;
            let batch_n = (need + DEQUEUE_LOOKAHEAD).min(remaining_budget);

            let batch = self.queue.dequeue(batch_n);
            if batch.is_empty() {
                break;
            }
            total_dequeued += batch.len();

            for track in batch {
                if delivered.len() >= limit || exclude.contains(&track.id) {
                    unused.push(track);
                } else {
                    delivered.push(track);
                }
            }
        }

        if !unused.is_empty() {
            self.queue.re_enqueue(unused);
        }

        let queue_size_after = self.queue.size();
        let refill_triggered = self.maybe_schedule_refill(queue_size_after);

        SuggestionsResponse {
            meta: SuggestionsMeta {
                requested: limit,
                delivered: delivered.len(),
                queue_size_after,
                refill_triggered,
                ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            data: delivered,
        }
    }

    /// `refill_triggered` reflects whether a schedule attempt was made, not
    /// whether the refill itself succeeds — the spawned task's outcome is
    /// fire-and-forget and does not affect this response.
    fn maybe_schedule_refill(&self, queue_size_after: usize) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };
        if queue_size_after >= worker.min_threshold() {
            return false;
        }
        let worker = worker.clone();
        tokio::spawn(async move {
            let refilled = worker.trigger_refill().await;
            debug!(refilled, "one-shot refill completed");
        });
        true
    }
}
