//! Playback and viewer-session calls
//!
//! Progress reporting, favourites, recently watched, parental PIN check and
//! playback details. Same contract as the content service: expected failures
//! come back as `Outcome`, never as errors.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use super::content::envelope_from_value;
use crate::api::{ApiError, ApiResponse, HttpClient};
use crate::models::{ContentEnvelope, Outcome, QueryParams};

pub const PROGRESS_PATH: &str = "progress";
pub const FAVOURITES_PATH: &str = "favourites";
pub const RECENTLY_WATCHED_PATH: &str = "recently-watched";
pub const PIN_PATH: &str = "profiles/pin";

/// Result of a parental PIN check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "details", rename_all = "lowercase")]
pub enum PinCheck {
    Accepted,
    /// Server's own rejection body, untouched
    Rejected(Option<Value>),
}

pub struct PlaybackService {
    http: Arc<HttpClient>,
    platform: String,
    page_size: u32,
}

impl PlaybackService {
    pub fn new(http: Arc<HttpClient>, platform: impl Into<String>, page_size: u32) -> Self {
        Self {
            http,
            platform: platform.into(),
            page_size,
        }
    }

    /// Store the viewer's position in `uid`
    pub async fn report_progress(
        &self,
        uid: &str,
        position_secs: u64,
        duration_secs: Option<u64>,
    ) -> Outcome<()> {
        let body = json!({
            "contentId": uid,
            "position": position_secs,
            "duration": duration_secs,
            "platform": self.platform,
        });
        unit(self.http.put(PROGRESS_PATH, body).await, PROGRESS_PATH)
    }

    pub async fn recently_watched(&self, page: u32) -> Outcome<ContentEnvelope> {
        let params = QueryParams::new()
            .with("page", page.to_string())
            .with("size", self.page_size.to_string())
            .with("platform", self.platform.as_str());

        match self.http.get(RECENTLY_WATCHED_PATH, params).await {
            Ok(response) => envelope_from_value(response.body),
            Err(err) => failed(err, RECENTLY_WATCHED_PATH),
        }
    }

    pub async fn add_favourite(&self, uid: &str) -> Outcome<()> {
        let path = format!("{}/{}", FAVOURITES_PATH, uid);
        unit(self.http.put(&path, json!({})).await, &path)
    }

    pub async fn remove_favourite(&self, uid: &str) -> Outcome<()> {
        let path = format!("{}/{}", FAVOURITES_PATH, uid);
        unit(self.http.delete(&path).await, &path)
    }

    /// Check the active profile's parental PIN.
    ///
    /// A rejected PIN does not log the viewer out.
    pub async fn verify_pin(&self, pin: &str) -> Outcome<PinCheck> {
        match self.http.put(PIN_PATH, json!({ "pin": pin })).await {
            Ok(_) => Outcome::Ready(PinCheck::Accepted),
            Err(ApiError::Unauthorized { body }) => Outcome::Ready(PinCheck::Rejected(body)),
            Err(err) => failed(err, PIN_PATH),
        }
    }

    /// Stream URLs, DRM info and markers for `uid`
    pub async fn playback_details(&self, uid: &str) -> Outcome<Value> {
        let path = format!("playback/{}", uid);
        let params = QueryParams::new().with("platform", self.platform.as_str());
        match self.http.get(&path, params).await {
            Ok(response) if response.body.is_null() => Outcome::Empty,
            Ok(response) => Outcome::Ready(response.body),
            Err(err) => failed(err, &path),
        }
    }
}

fn unit(result: Result<ApiResponse, ApiError>, path: &str) -> Outcome<()> {
    match result {
        Ok(_) => Outcome::Ready(()),
        Err(err) => failed(err, path),
    }
}

fn failed<T>(err: ApiError, path: &str) -> Outcome<T> {
    warn!(path = %path, kind = %err.kind(), "playback call failed: {}", err);
    Outcome::Failed(err.kind())
}
