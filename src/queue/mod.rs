//! Bounded, concurrency-safe FIFO of [`Track`]s with drop-oldest overflow.
//!
//! A single [`std::sync::Mutex`] guards both the sequence and its counters
//! so that eviction on overflow runs inside the same critical section as the
//! enqueue that triggered it: readers never observe `size() > capacity`.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

use crate::models::Track;

const WATERMARK_LOG_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct QueueStats {
    pub size: usize,
    pub capacity: usize,
    pub enqueued: u64,
    pub dequeued: u64,
    pub dropped: u64,
}

struct Inner {
    items: VecDeque<Track>,
    enqueued: u64,
    dequeued: u64,
    dropped: u64,
    last_watermark_log: Option<Instant>,
}

/// Bounded FIFO. `capacity` and `low_watermark` are fixed at construction.
pub struct TrackQueue {
    capacity: usize,
    low_watermark: usize,
    inner: Mutex<Inner>,
}

impl TrackQueue {
    pub fn new(capacity: usize, low_watermark: usize) -> Self {
        Self {
            capacity,
            low_watermark,
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                enqueued: 0,
                dequeued: 0,
                dropped: 0,
                last_watermark_log: None,
            }),
        }
    }

    /// Appends valid items to the tail, filtering out any missing
    /// `id`/`title`/`artist`. Evicts from the head to restore `size <=
    /// capacity` inside the same lock. Returns the number of valid items
    /// received, regardless of whether they were subsequently evicted.
    pub fn enqueue(&self, items: Vec<Track>) -> usize {
        let valid: Vec<Track> = items
            .into_iter()
            .filter(|t| !t.id.is_empty() && !t.title.is_empty() && !t.artist.is_empty())
            .collect();
        let accepted = valid.len();

        let mut guard = self.inner.lock().expect("track queue mutex poisoned");
        for track in valid {
            guard.items.push_back(track);
            guard.enqueued += 1;
        }
        while guard.items.len() > self.capacity {
            guard.items.pop_front();
            guard.dropped += 1;
        }
        self.maybe_log_watermark(&mut guard);

        accepted
    }

    /// Identical semantics to [`Self::enqueue`]; named separately so callers
    /// (the Suggestions Service) can express intent.
    pub fn re_enqueue(&self, items: Vec<Track>) -> usize {
        self.enqueue(items)
    }

    /// Removes up to `n` items from the head, in FIFO order.
    pub fn dequeue(&self, n: usize) -> Vec<Track> {
        let mut guard = self.inner.lock().expect("track queue mutex poisoned");
        let n = n.min(guard.items.len());
        let out: Vec<Track> = guard.items.drain(..n).collect();
        guard.dequeued += out.len() as u64;
        self.maybe_log_watermark(&mut guard);
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        let guard = self.inner.lock().expect("track queue mutex poisoned");
        guard.items.iter().any(|t| t.id == id)
    }

    pub fn size(&self) -> usize {
        self.inner.lock().expect("track queue mutex poisoned").items.len()
    }

    pub fn clear(&self) {
        let mut guard = self.inner.lock().expect("track queue mutex poisoned");
        guard.items.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> QueueStats {
        let guard = self.inner.lock().expect("track queue mutex poisoned");
        QueueStats {
            size: guard.items.len(),
            capacity: self.capacity,
            enqueued: guard.enqueued,
            dequeued: guard.dequeued,
            dropped: guard.dropped,
        }
    }

    fn maybe_log_watermark(&self, guard: &mut Inner) {
        if guard.items.len() > self.low_watermark {
            return;
        }
        let now = Instant::now();
        let should_log = match guard.last_watermark_log {
            Some(last) => now.duration_since(last) >= WATERMARK_LOG_INTERVAL,
            None => true,
        };
        if should_log {
            warn!(
                size = guard.items.len(),
                low_watermark = self.low_watermark,
                "track queue below low watermark"
            );
            guard.last_watermark_log = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: "title".to_string(),
            artist: "artist".to_string(),
            artwork_url: None,
            preview_url: Some("https://example.com/p.m4a".to_string()),
            album: None,
            genre: None,
            duration_ms: None,
        }
    }

    #[test]
    fn enqueue_drops_invalid_items() {
        let q = TrackQueue::new(10, 1);
        let invalid = Track {
            id: String::new(),
            ..track("x")
        };
        let accepted = q.enqueue(vec![invalid]);
        assert_eq!(accepted, 0);
        assert_eq!(q.size(), 0);
    }

    #[test]
    fn drop_oldest_on_overflow() {
        let q = TrackQueue::new(3, 0);
        let items = vec![track("a"), track("b"), track("c"), track("d"), track("e")];
        q.enqueue(items);
        let stats = q.stats();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.dropped, 2);

        let remaining = q.dequeue(3);
        assert_eq!(
            remaining.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["c", "d", "e"]
        );
    }

    #[test]
    fn counters_satisfy_enqueued_equals_dequeued_plus_size_plus_dropped() {
        let q = TrackQueue::new(3, 0);
        q.enqueue(vec![track("a"), track("b"), track("c"), track("d"), track("e")]);
        q.dequeue(2);
        let stats = q.stats();
        assert_eq!(stats.enqueued, stats.dequeued + stats.size as u64 + stats.dropped);
    }

    #[test]
    fn dequeue_is_fifo_and_best_effort() {
        let q = TrackQueue::new(10, 0);
        q.enqueue(vec![track("a"), track("b")]);
        let out = q.dequeue(5);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "a");
        assert_eq!(q.dequeue(1).len(), 0);
    }

    #[test]
    fn contains_reports_presence_by_id() {
        let q = TrackQueue::new(10, 0);
        q.enqueue(vec![track("a")]);
        assert!(q.contains("a"));
        assert!(!q.contains("b"));
    }

    #[tracing_test::traced_test]
    #[test]
    fn logs_warning_when_size_falls_to_or_below_low_watermark() {
        let q = TrackQueue::new(10, 2);
        q.enqueue(vec![track("a"), track("b")]);
        assert!(tracing_test::logs_contain("track queue below low watermark"));
    }

    #[tracing_test::traced_test]
    #[test]
    fn does_not_log_warning_above_low_watermark() {
        let q = TrackQueue::new(10, 2);
        q.enqueue(vec![track("a"), track("b"), track("c"), track("d")]);
        assert!(!tracing_test::logs_contain("track queue below low watermark"));
    }
}
