//! Merging the remote video list with the locally cached one.
//!
//! The merge is a union keyed by id: every remote video is kept in server
//! order, then cached videos whose id the server did not return are
//! appended in cache order. On a shared id the remote copy wins whole;
//! fields are never merged. Nothing is ever removed, so a video deleted on
//! the server but still cached comes back after a merge.

use std::collections::HashSet;

use crate::models::Video;

/// Result of a merge, with the ids that only the cache knew about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub videos: Vec<Video>,
    pub cache_only_ids: Vec<String>,
}

/// Union of `remote` and `cached` keyed by id, remote first.
pub fn reconcile(remote: Vec<Video>, cached: Vec<Video>) -> Vec<Video> {
    reconcile_detailed(remote, cached).videos
}

pub fn reconcile_detailed(remote: Vec<Video>, cached: Vec<Video>) -> Reconciliation {
    let remote_ids: HashSet<String> = remote.iter().map(|v| v.id.clone()).collect();
    let mut videos = remote;
    let mut cache_only_ids = Vec::new();

    for video in cached {
        if !remote_ids.contains(&video.id) {
            cache_only_ids.push(video.id.clone());
            videos.push(video);
        }
    }

    Reconciliation {
        videos,
        cache_only_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn video(id: &str, title: &str) -> Video {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title }))
            .expect("valid video")
    }

    fn ids(videos: &[Video]) -> Vec<&str> {
        videos.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_disjoint_sets_keep_remote_then_cache_order() {
        let remote = vec![video("3", "C"), video("1", "A")];
        let cached = vec![video("5", "E"), video("4", "D")];

        let merged = reconcile(remote, cached);
        assert_eq!(merged.len(), 4);
        assert_eq!(ids(&merged), vec!["3", "1", "5", "4"]);
    }

    #[test]
    fn test_overlapping_id_keeps_remote_copy() {
        let remote = vec![video("1", "A")];
        let cached = vec![video("1", "A-old"), video("2", "B")];

        let merged = reconcile(remote, cached);
        assert_eq!(merged, vec![video("1", "A"), video("2", "B")]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reconcile(vec![], vec![]).is_empty());
        assert_eq!(ids(&reconcile(vec![], vec![video("2", "B")])), vec!["2"]);
        assert_eq!(ids(&reconcile(vec![video("1", "A")], vec![])), vec!["1"]);
    }

    #[test]
    fn test_detailed_reports_cache_only_ids() {
        let remote = vec![video("1", "A")];
        let cached = vec![video("2", "B"), video("1", "A-old"), video("7", "G")];

        let result = reconcile_detailed(remote, cached);
        assert_eq!(result.cache_only_ids, vec!["2".to_string(), "7".to_string()]);
        assert_eq!(ids(&result.videos), vec!["1", "2", "7"]);
    }

    #[test]
    fn test_repeated_cache_ids_are_all_appended() {
        // Only remote ids filter the cache; the cache list itself is not deduplicated
        let cached = vec![video("2", "B"), video("2", "B-dup"), video("1", "old")];
        let merged = reconcile(vec![video("1", "A")], cached);
        assert_eq!(
            merged,
            vec![video("1", "A"), video("2", "B"), video("2", "B-dup")]
        );
    }

    #[test]
    fn test_remote_duplicates_are_left_alone() {
        // Remote order and content pass through untouched
        let remote = vec![video("1", "A"), video("1", "A2")];
        let merged = reconcile(remote.clone(), vec![video("1", "old")]);
        assert_eq!(merged, remote);
    }
}
