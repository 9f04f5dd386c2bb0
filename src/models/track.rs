use serde::{Deserialize, Serialize};

/// A single playable candidate handed to clients for swipe-style evaluation.
///
/// `(id, title, artist)` is guaranteed present on every `Track` that has
/// entered a [`crate::queue::TrackQueue`]; `preview_url` determines whether
/// the track is actually playable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl Track {
    /// A track is playable only when it carries a non-empty preview URL.
    pub fn is_playable(&self) -> bool {
        self.preview_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(preview_url: Option<&str>) -> Track {
        Track {
            id: "1".into(),
            title: "t".into(),
            artist: "a".into(),
            artwork_url: None,
            preview_url: preview_url.map(str::to_string),
            album: None,
            genre: None,
            duration_ms: None,
        }
    }

    #[test]
    fn playable_requires_non_empty_preview_url() {
        assert!(track(Some("https://example.com/preview.m4a")).is_playable());
        assert!(!track(Some("")).is_playable());
        assert!(!track(None).is_playable());
    }
}
