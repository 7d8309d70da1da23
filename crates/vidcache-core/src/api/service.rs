use std::future::Future;

use crate::models::{NewVideo, Video};

use super::ApiError;

/// Remote operations the collection needs from a backend.
///
/// `ApiClient` is the HTTP implementation; tests substitute in-process fakes.
pub trait VideoService {
    fn fetch_videos(&self) -> impl Future<Output = Result<Vec<Video>, ApiError>> + Send;

    fn create_video(&self, video: &NewVideo) -> impl Future<Output = Result<Video, ApiError>> + Send;

    fn update_video(
        &self,
        id: &str,
        video: &Video,
    ) -> impl Future<Output = Result<Video, ApiError>> + Send;

    fn delete_video(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}
