//! Converts raw catalog records into canonical [`Track`]s, filtering
//! incomplete records and suppressing recently-seen identifiers.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::catalog::CatalogRecord;
use crate::models::Track;

/// Track identifiers seen within the last `dedupe_window`. Cleared wholesale
/// once the window elapses, rather than evicting individually.
pub struct RecentTrackIds {
    dedupe_window: Duration,
    inner: Mutex<RecentState>,
}

struct RecentState {
    seen: HashSet<String>,
    last_cleanup: Instant,
}

impl RecentTrackIds {
    pub fn new(dedupe_window: Duration) -> Self {
        Self {
            dedupe_window,
            inner: Mutex::new(RecentState {
                seen: HashSet::new(),
                last_cleanup: Instant::now(),
            }),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.inner.lock().expect("recent track ids mutex poisoned").seen.contains(id)
    }

    fn insert(&self, id: String) {
        let mut guard = self.inner.lock().expect("recent track ids mutex poisoned");
        guard.seen.insert(id);
        if guard.last_cleanup.elapsed() >= self.dedupe_window {
            guard.seen.clear();
            guard.last_cleanup = Instant::now();
        }
    }
}

impl Default for RecentTrackIds {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

/// Turns raw catalog records into [`Track`]s, dropping incomplete records
/// and suppressing IDs already seen within the dedupe window.
pub struct Normalizer {
    recent: RecentTrackIds,
}

impl Normalizer {
    pub fn new(dedupe_window: Duration) -> Self {
        Self {
            recent: RecentTrackIds::new(dedupe_window),
        }
    }

    pub fn normalize_batch(&self, records: Vec<CatalogRecord>) -> Vec<Track> {
        records
            .into_iter()
            .filter_map(|record| self.normalize_one(record))
            .collect()
    }

    fn normalize_one(&self, record: CatalogRecord) -> Option<Track> {
        let track_id = record.track_id.as_ref()?;
        let id = match track_id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let title = record.track_name?;
        let artist = record.artist_name?;
        let preview_url = record.preview_url?;
        let artwork_url_100 = record.artwork_url_100?;

        if self.recent.contains(&id) {
            return None;
        }

        let artwork_url = artwork_url_100.replace("100x100", "600x600");

        let track = Track {
            id: id.clone(),
            title,
            artist,
            artwork_url: Some(artwork_url),
            preview_url: Some(preview_url),
            album: record.collection_name,
            genre: record.primary_genre_name,
            duration_ms: record.track_time_millis,
        };

        self.recent.insert(id);

        Some(track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(track_id: i64) -> CatalogRecord {
        CatalogRecord {
            track_id: Some(serde_json::json!(track_id)),
            track_name: Some("title".to_string()),
            artist_name: Some("artist".to_string()),
            preview_url: Some("https://example.com/p.m4a".to_string()),
            artwork_url_100: Some("https://example.com/100x100bb.jpg".to_string()),
            collection_name: Some("album".to_string()),
            track_time_millis: Some(210000),
            primary_genre_name: Some("Pop".to_string()),
        }
    }

    #[test]
    fn drops_records_missing_required_fields() {
        let normalizer = Normalizer::new(Duration::from_secs(60));
        let mut incomplete = record(1);
        incomplete.preview_url = None;
        let tracks = normalizer.normalize_batch(vec![incomplete]);
        assert!(tracks.is_empty());
    }

    #[test]
    fn rewrites_artwork_to_high_resolution() {
        let normalizer = Normalizer::new(Duration::from_secs(60));
        let tracks = normalizer.normalize_batch(vec![record(1)]);
        assert_eq!(
            tracks[0].artwork_url.as_deref(),
            Some("https://example.com/600x600bb.jpg")
        );
    }

    #[test]
    fn suppresses_duplicate_ids_within_dedupe_window() {
        let normalizer = Normalizer::new(Duration::from_secs(60));
        let first = normalizer.normalize_batch(vec![record(1001)]);
        let second = normalizer.normalize_batch(vec![record(1001)]);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn is_idempotent_within_one_dedupe_window() {
        let normalizer = Normalizer::new(Duration::from_secs(60));
        let batch = vec![record(42), record(42), record(42)];
        let tracks = normalizer.normalize_batch(batch);
        assert_eq!(tracks.len(), 1);
    }
}
