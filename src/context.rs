//! Application context
//!
//! Owns the shared client, cache and session for one process and hands them to
//! the services. Built once at startup, torn down with `shutdown`.

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::api::diagnostics::{LogUnauthorized, TracingSink};
use crate::api::{DiagnosticsSink, HttpClient, UnauthorizedHandler};
use crate::cache::{CacheTtl, ResponseCache};
use crate::config::Config;
use crate::models::{ComponentDescriptor, ContentEnvelope, Outcome};
use crate::services::{ConnectivityService, ContentService, PlaybackService, RecommendationProvider};
use crate::session::{keys, MemorySession, SessionStateStore};

pub struct Storefront {
    config: Config,
    session: Arc<dyn SessionStateStore>,
    http: Arc<HttpClient>,
    content: ContentService,
    playback: PlaybackService,
    connectivity: ConnectivityService,
}

/// Collaborators for a `Storefront`; anything left unset gets a default
pub struct StorefrontBuilder {
    config: Config,
    session: Option<Arc<dyn SessionStateStore>>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    unauthorized: Arc<dyn UnauthorizedHandler>,
    recommendations: Option<Arc<dyn RecommendationProvider>>,
}

impl StorefrontBuilder {
    pub fn session(mut self, session: Arc<dyn SessionStateStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized = handler;
        self
    }

    pub fn recommendations(mut self, provider: Arc<dyn RecommendationProvider>) -> Self {
        self.recommendations = Some(provider);
        self
    }

    pub fn build(self) -> Storefront {
        let config = self.config;

        let session = self.session.unwrap_or_else(|| Arc::new(MemorySession::new()));
        if let Some(token) = &config.profile_token {
            session.set_state(keys::PROFILE_TOKEN, Value::String(token.clone()));
        }
        if let Some(token) = &config.consumer_token {
            session.set_state(keys::CONSUMER_TOKEN, Value::String(token.clone()));
        }

        let http = Arc::new(
            HttpClient::new(config.base_url.as_str(), config.project, Arc::clone(&session))
                .with_timeout(config.timeout())
                .with_retry(config.retry.clone())
                .with_diagnostics(self.diagnostics)
                .with_unauthorized_handler(self.unauthorized),
        );

        let mut content = ContentService::new(
            Arc::clone(&http),
            Arc::new(ResponseCache::new()),
            config.platform.as_str(),
            config.page_size,
        );
        if let Some(provider) = self.recommendations {
            content = content.with_recommendations(provider);
        }

        let playback = PlaybackService::new(Arc::clone(&http), config.platform.as_str(), config.page_size);
        let connectivity = ConnectivityService::new(Arc::clone(&http));

        info!(base_url = %config.base_url, project = %config.project, "storefront ready");

        Storefront {
            config,
            session,
            http,
            content,
            playback,
            connectivity,
        }
    }
}

impl Storefront {
    pub fn builder(config: Config) -> StorefrontBuilder {
        StorefrontBuilder {
            config,
            session: None,
            diagnostics: Arc::new(TracingSink),
            unauthorized: Arc::new(LogUnauthorized),
            recommendations: None,
        }
    }

    pub fn new(config: Config) -> Self {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Arc<dyn SessionStateStore> {
        &self.session
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn content(&self) -> &ContentService {
        &self.content
    }

    pub fn playback(&self) -> &PlaybackService {
        &self.playback
    }

    pub async fn fetch_component_data(
        &self,
        descriptor: &ComponentDescriptor,
        ttl: CacheTtl,
        initiator_id: Option<&str>,
        initiator_type: Option<&str>,
        page: Option<u32>,
    ) -> Outcome<ContentEnvelope> {
        self.content
            .fetch_component_data(descriptor, ttl, initiator_id, initiator_type, page)
            .await
    }

    pub async fn fetch_details(&self, uid: &str, kind: &str, ttl: Option<CacheTtl>) -> Outcome<Value> {
        self.content
            .fetch_details(uid, kind, ttl.unwrap_or_default())
            .await
    }

    pub async fn check_connectivity(&self) -> bool {
        self.connectivity.check_connectivity().await
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn cancel_all_requests(&self) {
        self.http.abort_all_requests();
    }

    /// Cancel in-flight work and drop cached responses
    pub fn shutdown(self) {
        self.http.abort_all_requests();
        self.content.cache().invalidate_all();
        info!("storefront shut down");
    }
}
