use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Video;

use super::store::KeyValueStore;

/// Slot holding the last-known video list
pub const VIDEOS_SLOT: &str = "videos";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    /// Absent when the slot held a bare list written without an envelope
    #[serde(default)]
    pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Some(Utc::now()),
        }
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.cached_at.map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        let Some(minutes) = self.age_minutes() else {
            return "unknown".to_string();
        };
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Either shape a slot may hold on disk
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSlot<T> {
    Envelope(CachedData<T>),
    Bare(T),
}

pub struct CacheManager<S> {
    store: S,
}

impl<S: KeyValueStore> CacheManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let Some(contents) = self.store.get(name)? else {
            return Ok(None);
        };

        let slot: StoredSlot<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache slot: {}", name))?;

        Ok(Some(match slot {
            StoredSlot::Envelope(cached) => cached,
            StoredSlot::Bare(data) => CachedData {
                data,
                cached_at: None,
            },
        }))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        self.store.set(name, &contents)
    }

    // ===== Videos =====

    pub fn load_videos(&self) -> Result<Option<CachedData<Vec<Video>>>> {
        self.load(VIDEOS_SLOT)
    }

    /// Rewrite the whole slot with the given list
    pub fn save_videos(&self, videos: &[Video]) -> Result<()> {
        self.save(VIDEOS_SLOT, &videos)?;
        debug!(count = videos.len(), "Video cache written");
        Ok(())
    }

    /// Cached list, or empty when the slot is missing or unreadable
    pub fn cached_videos(&self) -> Vec<Video> {
        match self.load_videos() {
            Ok(Some(cached)) => cached.data,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(cache = VIDEOS_SLOT, error = %e, "Failed to load cache, treating as empty");
                Vec::new()
            }
        }
    }

    /// "5m ago" style age of the video slot, if there is one
    pub fn videos_age(&self) -> Option<String> {
        match self.load_videos() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = VIDEOS_SLOT, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use chrono::Duration;

    fn video(id: &str, title: &str) -> Video {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title }))
            .expect("valid video")
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(vec![1]);
        cached.cached_at = Some(Utc::now() - Duration::minutes(5));
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Some(Utc::now() - Duration::minutes(95));
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Some(Utc::now() - Duration::hours(50));
        assert_eq!(cached.age_display(), "2d ago");

        cached.cached_at = None;
        assert_eq!(cached.age_display(), "unknown");
    }

    #[test]
    fn test_save_then_load_videos() {
        let cache = CacheManager::new(MemoryStore::new());
        assert!(cache.load_videos().expect("load").is_none());

        cache
            .save_videos(&[video("1", "A"), video("2", "B")])
            .expect("save");

        let loaded = cache.load_videos().expect("load").expect("present");
        assert_eq!(loaded.data.len(), 2);
        assert_eq!(loaded.data[1].title, "B");
        assert!(loaded.cached_at.is_some());
        assert_eq!(cache.videos_age().as_deref(), Some("just now"));
    }

    #[test]
    fn test_load_accepts_bare_array() {
        let store = MemoryStore::new();
        store
            .set(VIDEOS_SLOT, r#"[{"id":"9","title":"X"}]"#)
            .expect("set");
        let cache = CacheManager::new(store);

        let loaded = cache.load_videos().expect("load").expect("present");
        assert_eq!(loaded.data, vec![video("9", "X")]);
        assert!(loaded.cached_at.is_none());
    }

    #[test]
    fn test_corrupt_slot_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(VIDEOS_SLOT, "{not json").expect("set");
        let cache = CacheManager::new(store);

        assert!(cache.load_videos().is_err());
        assert!(cache.cached_videos().is_empty());
        assert!(cache.videos_age().is_none());
    }

    #[test]
    fn test_saving_empty_list_overwrites_slot() {
        let cache = CacheManager::new(MemoryStore::new());
        cache.save_videos(&[video("2", "B")]).expect("save");
        cache.save_videos(&[]).expect("save");
        assert!(cache.cached_videos().is_empty());
    }
}
