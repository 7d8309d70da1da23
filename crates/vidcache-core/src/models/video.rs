use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of stars shown for a rating
pub const MAX_STARS: usize = 5;

/// Ratings are stored on a 0-50 scale; each star covers this many points
const RATING_POINTS_PER_STAR: f64 = 10.0;

/// A single catalog entry as exchanged with the REST backend and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Video {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(rename = "name", default)]
    pub instructor_name: String,
    #[serde(rename = "position", default)]
    pub instructor_position: String,
    #[serde(rename = "reviews", default)]
    pub review_count: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "img", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Video {
    /// Numeric value of the id, if it is one
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }

    /// Number of filled stars out of `MAX_STARS`
    pub fn stars(&self) -> usize {
        if !self.rating.is_finite() || self.rating <= 0.0 {
            return 0;
        }
        ((self.rating / RATING_POINTS_PER_STAR).round() as usize).min(MAX_STARS)
    }

    /// Star bar like "★★★☆☆"
    pub fn star_display(&self) -> String {
        let filled = self.stars();
        format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_STARS - filled))
    }

    pub fn instructor_display(&self) -> String {
        match (self.instructor_name.is_empty(), self.instructor_position.is_empty()) {
            (false, false) => format!("{} - {}", self.instructor_name, self.instructor_position),
            (false, true) => self.instructor_name.clone(),
            (true, false) => self.instructor_position.clone(),
            (true, true) => "Unknown instructor".to_string(),
        }
    }
}

/// Body of a create request: every field except the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVideo {
    pub title: String,
    pub price: String,
    #[serde(rename = "name")]
    pub instructor_name: String,
    #[serde(rename = "position")]
    pub instructor_position: String,
    #[serde(rename = "reviews")]
    pub review_count: u32,
    pub rating: f64,
    #[serde(rename = "img", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl NewVideo {
    /// Attach an id, producing the full video
    pub fn with_id(self, id: String) -> Video {
        Video {
            id,
            title: self.title,
            price: self.price,
            instructor_name: self.instructor_name,
            instructor_position: self.instructor_position,
            review_count: self.review_count,
            rating: self.rating,
            image_ref: self.image_ref,
        }
    }
}

/// Text state of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDraft {
    pub title: String,
    pub price: String,
    pub instructor_name: String,
    pub instructor_position: String,
    pub review_count: String,
    pub rating: f64,
}

impl VideoDraft {
    /// Pre-fill a draft from an existing video (edit mode)
    pub fn from_video(video: &Video) -> Self {
        Self {
            title: video.title.clone(),
            price: video.price.clone(),
            instructor_name: video.instructor_name.clone(),
            instructor_position: video.instructor_position.clone(),
            review_count: video.review_count.to_string(),
            rating: video.rating,
        }
    }

    /// Parsed review count, if the field holds a non-negative integer
    pub fn parsed_review_count(&self) -> Option<u32> {
        self.review_count.trim().parse().ok()
    }

    /// All required fields present and the review count is a number.
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty()
            && !self.price.is_empty()
            && !self.instructor_name.is_empty()
            && !self.instructor_position.is_empty()
            && self.parsed_review_count().is_some()
    }

    /// Build a create request. New videos start unrated with no image.
    pub fn to_new_video(&self) -> Option<NewVideo> {
        if !self.is_complete() {
            return None;
        }
        Some(NewVideo {
            title: self.title.clone(),
            price: self.price.clone(),
            instructor_name: self.instructor_name.clone(),
            instructor_position: self.instructor_position.clone(),
            review_count: self.parsed_review_count()?,
            rating: 0.0,
            image_ref: None,
        })
    }

    /// Apply the form fields onto an existing video, keeping its id, rating and image.
    pub fn apply_to(&self, existing: &Video) -> Option<Video> {
        if !self.is_complete() {
            return None;
        }
        Some(Video {
            title: self.title.clone(),
            price: self.price.clone(),
            instructor_name: self.instructor_name.clone(),
            instructor_position: self.instructor_position.clone(),
            review_count: self.parsed_review_count()?,
            ..existing.clone()
        })
    }
}

/// Accept ids as either JSON strings or numbers; numbers are normalized to decimal text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
        RawId::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(rating: f64) -> Video {
        Video {
            id: "1".to_string(),
            title: "Rust Basics".to_string(),
            price: "Rp 300K".to_string(),
            instructor_name: "Jenna Ortega".to_string(),
            instructor_position: "Senior Engineer".to_string(),
            review_count: 86,
            rating,
            image_ref: None,
        }
    }

    #[test]
    fn test_stars_rounds_rating_over_ten() {
        assert_eq!(video(0.0).stars(), 0);
        assert_eq!(video(14.9).stars(), 1);
        assert_eq!(video(35.0).stars(), 4); // round half away from zero
        assert_eq!(video(50.0).stars(), 5);
        assert_eq!(video(80.0).stars(), 5); // clamped
        assert_eq!(video(-3.0).stars(), 0);
        assert_eq!(video(f64::NAN).stars(), 0);
    }

    #[test]
    fn test_star_display() {
        assert_eq!(video(30.0).star_display(), "★★★☆☆");
        assert_eq!(video(0.0).star_display(), "☆☆☆☆☆");
    }

    #[test]
    fn test_deserialize_wire_format() {
        let json = r#"{"id":"7","title":"Big 4 Auditor","price":"Rp 300K","name":"Jenna","position":"Senior Accountant","reviews":86,"rating":35,"img":"img1.png"}"#;
        let v: Video = serde_json::from_str(json).expect("valid video json");
        assert_eq!(v.id, "7");
        assert_eq!(v.instructor_name, "Jenna");
        assert_eq!(v.instructor_position, "Senior Accountant");
        assert_eq!(v.review_count, 86);
        assert_eq!(v.image_ref.as_deref(), Some("img1.png"));
    }

    #[test]
    fn test_deserialize_numeric_id_and_missing_fields() {
        let v: Video = serde_json::from_str(r#"{"id": 12, "title": "X"}"#).expect("valid json");
        assert_eq!(v.id, "12");
        assert_eq!(v.numeric_id(), Some(12));
        assert_eq!(v.review_count, 0);
        assert_eq!(v.rating, 0.0);
        assert!(v.image_ref.is_none());
    }

    #[test]
    fn test_serialize_omits_missing_image() {
        let value = serde_json::to_value(video(10.0)).expect("serializable");
        assert!(value.get("img").is_none());
        assert_eq!(value["name"], "Jenna Ortega");
        assert_eq!(value["reviews"], 86);
    }

    #[test]
    fn test_new_video_has_no_id_field() {
        let draft = VideoDraft::from_video(&video(40.0));
        let body = serde_json::to_value(draft.to_new_video().expect("complete draft"))
            .expect("serializable");
        assert!(body.get("id").is_none());
        assert_eq!(body["rating"], 0.0);
    }

    #[test]
    fn test_draft_completeness() {
        let mut draft = VideoDraft::from_video(&video(10.0));
        assert!(draft.is_complete());

        draft.price.clear();
        assert!(!draft.is_complete());
        assert!(draft.to_new_video().is_none());

        let mut draft = VideoDraft::from_video(&video(10.0));
        draft.review_count = "lots".to_string();
        assert!(!draft.is_complete());
    }

    #[test]
    fn test_apply_to_keeps_id_rating_and_image() {
        let mut existing = video(42.0);
        existing.image_ref = Some("cover.png".to_string());

        let mut draft = VideoDraft::from_video(&existing);
        draft.title = "Rust Advanced".to_string();
        draft.review_count = "90".to_string();
        draft.rating = 0.0;

        let updated = draft.apply_to(&existing).expect("complete draft");
        assert_eq!(updated.id, "1");
        assert_eq!(updated.title, "Rust Advanced");
        assert_eq!(updated.review_count, 90);
        assert_eq!(updated.rating, 42.0);
        assert_eq!(updated.image_ref.as_deref(), Some("cover.png"));
    }

    #[test]
    fn test_instructor_display() {
        let mut v = video(0.0);
        assert_eq!(v.instructor_display(), "Jenna Ortega - Senior Engineer");
        v.instructor_position.clear();
        assert_eq!(v.instructor_display(), "Jenna Ortega");
        v.instructor_name.clear();
        assert_eq!(v.instructor_display(), "Unknown instructor");
    }
}
