//! API client for the video catalog REST backend.
//!
//! The backend exposes a single collection resource: `GET` and `POST` on the
//! base URL, `PUT` and `DELETE` on `{base}/{id}`.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{NewVideo, Video};

use super::service::VideoService;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the catalog backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given collection URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a client around an existing reqwest client, sharing its connection pool.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ApiError::NotConfigured);
        }
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, url)))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T, ApiError> {
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T, ApiError> {
        let response = self.client.put(url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, url).await
    }

    async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let response = self.client.delete(url).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Collection Methods =====

    /// Fetch the full video list in server order
    pub async fn fetch_videos(&self) -> Result<Vec<Video>, ApiError> {
        let videos: Vec<Video> = self.get(&self.base_url).await?;
        debug!(count = videos.len(), "Videos fetched");
        Ok(videos)
    }

    /// Create a video; the server may assign or normalize fields
    pub async fn create_video(&self, video: &NewVideo) -> Result<Video, ApiError> {
        let created: Video = self.post(&self.base_url, video).await?;
        debug!(id = %created.id, "Video created");
        Ok(created)
    }

    /// Replace the video with the given id
    pub async fn update_video(&self, id: &str, video: &Video) -> Result<Video, ApiError> {
        let updated: Video = self.put(&self.item_url(id), video).await?;
        debug!(id = %id, "Video updated");
        Ok(updated)
    }

    /// Delete the video with the given id. The confirmation body is ignored.
    pub async fn delete_video(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&self.item_url(id)).await?;
        debug!(id = %id, "Video deleted");
        Ok(())
    }
}

impl VideoService for ApiClient {
    async fn fetch_videos(&self) -> Result<Vec<Video>, ApiError> {
        ApiClient::fetch_videos(self).await
    }

    async fn create_video(&self, video: &NewVideo) -> Result<Video, ApiError> {
        ApiClient::create_video(self, video).await
    }

    async fn update_video(&self, id: &str, video: &Video) -> Result<Video, ApiError> {
        ApiClient::update_video(self, id, video).await
    }

    async fn delete_video(&self, id: &str) -> Result<(), ApiError> {
        ApiClient::delete_video(self, id).await
    }
}
