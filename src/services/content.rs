//! Content fetch orchestration
//!
//! Turns a component descriptor into at most one backend call (through the
//! response cache) and hands back a uniform `ContentEnvelope`. Expected
//! failures come back as `Outcome::Empty` / `Outcome::Failed`, never as errors.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::recommendation::{RecommendationProvider, RecommendationRequest};
use crate::api::{ErrorKind, HttpClient};
use crate::cache::{generate_cache_key, CacheTtl, ResponseCache};
use crate::models::{ComponentDescriptor, ComponentKind, ContentEnvelope, Outcome, QueryParams};

pub const FILTER_PREFIX: &str = "filter://";
pub const FILTERS_ENDPOINT: &str = "content/filters";
pub const ARCHIVE_ENDPOINT: &str = "content/archive";
pub const ITEMS_ENDPOINT: &str = "content/items";
pub const CURATED_CONTENT_TYPE: &str = "curatedData";

/// Where a descriptor's data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Items embedded in the descriptor
    Inline,
    /// Backend endpoint, relative to the base URL
    Endpoint(String),
    Recommendation,
    /// Nothing we know how to fetch
    Unsupported,
}

impl ContentSource {
    pub fn resolve(descriptor: &ComponentDescriptor) -> Self {
        if descriptor.curated_data.is_some() {
            return ContentSource::Inline;
        }

        match &descriptor.kind {
            ComponentKind::FeedId | ComponentKind::Calendar | ComponentKind::Highlights => {
                match descriptor.data.as_deref().map(filter_id) {
                    Some(id) if !id.is_empty() => {
                        ContentSource::Endpoint(format!("{}/{}", FILTERS_ENDPOINT, id))
                    }
                    _ => ContentSource::Unsupported,
                }
            }
            ComponentKind::Archive => ContentSource::Endpoint(ARCHIVE_ENDPOINT.to_string()),
            ComponentKind::Listing | ComponentKind::ListingParams => {
                ContentSource::Endpoint(ITEMS_ENDPOINT.to_string())
            }
            ComponentKind::Recommendation => ContentSource::Recommendation,
            ComponentKind::Other(_) => ContentSource::Unsupported,
        }
    }
}

/// `filter://1234` -> `1234`
pub fn filter_id(data: &str) -> &str {
    data.strip_prefix(FILTER_PREFIX).unwrap_or(data).trim()
}

/// Content service over the shared client and cache.
///
/// Dropping the service clears the shared response cache.
pub struct ContentService {
    http: Arc<HttpClient>,
    cache: Arc<ResponseCache>,
    recommendations: Option<Arc<dyn RecommendationProvider>>,
    platform: String,
    page_size: u32,
}

impl ContentService {
    pub fn new(
        http: Arc<HttpClient>,
        cache: Arc<ResponseCache>,
        platform: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            cache,
            recommendations: None,
            platform: platform.into(),
            page_size,
        }
    }

    pub fn with_recommendations(mut self, provider: Arc<dyn RecommendationProvider>) -> Self {
        self.recommendations = Some(provider);
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Data for one UI component
    pub async fn fetch_component_data(
        &self,
        descriptor: &ComponentDescriptor,
        ttl: CacheTtl,
        initiator_id: Option<&str>,
        initiator_type: Option<&str>,
        page: Option<u32>,
    ) -> Outcome<ContentEnvelope> {
        match ContentSource::resolve(descriptor) {
            ContentSource::Inline => inline_envelope(descriptor),
            ContentSource::Endpoint(endpoint) => {
                let params = self.component_params(descriptor, page);
                self.cached_get_checked(&endpoint, params, ttl, is_envelope)
                    .await
                    .and_then_envelope()
            }
            ContentSource::Recommendation => {
                self.recommend(descriptor, initiator_id, initiator_type, page)
                    .await
            }
            ContentSource::Unsupported => {
                warn!(kind = %descriptor.kind, data = ?descriptor.data, "no data source for component");
                Outcome::Empty
            }
        }
    }

    /// Detail entity for `uid` of `kind` (movie, series, episode, ...)
    pub async fn fetch_details(&self, uid: &str, kind: &str, ttl: CacheTtl) -> Outcome<Value> {
        let endpoint = format!("content/{}/{}", kind, uid);
        let params = QueryParams::new().with("platform", self.platform.as_str());
        self.cached_get(&endpoint, params, ttl).await
    }

    /// GET through the response cache.
    ///
    /// Only non-empty JSON objects/arrays are cached, and only for keys that
    /// were looked up with caching enabled.
    pub async fn cached_get(&self, endpoint: &str, params: QueryParams, ttl: CacheTtl) -> Outcome<Value> {
        self.cached_get_checked(endpoint, params, ttl, |_| true).await
    }

    /// `cached_get` that stores a response only if `valid` accepts it
    async fn cached_get_checked(
        &self,
        endpoint: &str,
        params: QueryParams,
        ttl: CacheTtl,
        valid: fn(&Value) -> bool,
    ) -> Outcome<Value> {
        let key = generate_cache_key(endpoint, &params);

        if let Some(payload) = self.cache.read(&key, ttl) {
            debug!(key = %key, "cache hit");
            return Outcome::Ready(payload);
        }

        match self.http.get(endpoint, params).await {
            Ok(response) => {
                if !is_cacheable(&response.body) {
                    return Outcome::Empty;
                }
                if !valid(&response.body) {
                    warn!(key = %key, "malformed response, not cached");
                } else if self.cache.write_if_marked(&key, &response.url, response.body.clone()) {
                    debug!(key = %key, %ttl, "cached response");
                }
                Outcome::Ready(response.body)
            }
            Err(err) => {
                warn!(endpoint = %endpoint, kind = %err.kind(), "content fetch failed: {}", err);
                Outcome::Failed(err.kind())
            }
        }
    }

    pub fn cancel_all_requests(&self) {
        self.http.abort_all_requests();
    }

    fn component_params(&self, descriptor: &ComponentDescriptor, page: Option<u32>) -> QueryParams {
        let mut params = descriptor.query_params();
        match page {
            Some(page) => params.insert("page", page.to_string()),
            None if !params.contains_key("page") => params.insert("page", "0"),
            None => {}
        }
        if !params.contains_key("size") {
            params.insert("size", self.page_size.to_string());
        }
        params.insert("platform", self.platform.as_str());
        params
    }

    async fn recommend(
        &self,
        descriptor: &ComponentDescriptor,
        initiator_id: Option<&str>,
        initiator_type: Option<&str>,
        page: Option<u32>,
    ) -> Outcome<ContentEnvelope> {
        let Some(provider) = &self.recommendations else {
            warn!("recommendation component without a recommendation provider");
            return Outcome::Ready(ContentEnvelope::error());
        };

        let params = descriptor.query_params();
        let size = params
            .get("size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.page_size);

        let request = RecommendationRequest {
            scenario: descriptor.data.clone(),
            initiator_id: initiator_id.map(str::to_string),
            initiator_type: initiator_type.map(str::to_string),
            page: page.unwrap_or(0),
            size,
            params,
        };

        match provider.fetch_items(request).await {
            Ok(items) => {
                let total = items.content.len() as u64;
                let mut extra = Map::new();
                if let Some(id) = items.recommendation_id {
                    extra.insert("recommendationId".to_string(), Value::String(id));
                }
                Outcome::Ready(ContentEnvelope {
                    content: items.content,
                    content_type: None,
                    status: Some("Success".to_string()),
                    total_pages: Some(1),
                    total_elements: Some(total),
                    extra,
                })
            }
            Err(err) => {
                warn!("recommendation fetch failed: {:#}", err);
                Outcome::Ready(ContentEnvelope::error())
            }
        }
    }
}

impl Drop for ContentService {
    fn drop(&mut self) {
        self.cache.invalidate_all();
    }
}

/// Descriptor as returned to the UI, with its curated items as `content`.
///
/// Descriptor fields are carried untyped in `extra`, whatever their values.
fn inline_envelope(descriptor: &ComponentDescriptor) -> Outcome<ContentEnvelope> {
    let mut fields = match serde_json::to_value(descriptor) {
        Ok(Value::Object(fields)) => fields,
        _ => return Outcome::Failed(ErrorKind::GenericApiError),
    };
    fields.remove("curatedData");
    fields.remove("content");
    fields.remove("contentType");

    Outcome::Ready(ContentEnvelope {
        content: descriptor.curated_data.clone().unwrap_or_default(),
        content_type: Some(CURATED_CONTENT_TYPE.to_string()),
        status: None,
        total_pages: None,
        total_elements: None,
        extra: fields,
    })
}

/// Non-null, non-empty object or array
pub fn is_cacheable(body: &Value) -> bool {
    match body {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Arrays, or objects that read as a `ContentEnvelope`
fn is_envelope(body: &Value) -> bool {
    match body {
        Value::Array(_) => true,
        Value::Object(_) => ContentEnvelope::deserialize(body).is_ok(),
        _ => false,
    }
}

/// Normalize a backend payload: arrays become `content`, objects are read as envelopes
pub fn envelope_from_value(body: Value) -> Outcome<ContentEnvelope> {
    match body {
        Value::Array(items) => Outcome::Ready(ContentEnvelope {
            total_elements: Some(items.len() as u64),
            content: items,
            ..ContentEnvelope::default()
        }),
        Value::Object(_) => match serde_json::from_value(body) {
            Ok(envelope) => Outcome::Ready(envelope),
            Err(err) => {
                warn!("unexpected content payload: {}", err);
                Outcome::Failed(ErrorKind::GenericApiError)
            }
        },
        _ => Outcome::Empty,
    }
}

trait EnvelopeOutcome {
    fn and_then_envelope(self) -> Outcome<ContentEnvelope>;
}

impl EnvelopeOutcome for Outcome<Value> {
    fn and_then_envelope(self) -> Outcome<ContentEnvelope> {
        match self {
            Outcome::Ready(body) => envelope_from_value(body),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(kind) => Outcome::Failed(kind),
        }
    }
}
