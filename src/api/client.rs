//! Storefront REST client
//!
//! The single outbound HTTP gateway. Each request goes through:
//! signer (GET params) -> auth (bearer token) -> abort registration -> transport.
//! Responses release the abort handle and failures are classified and escalated.

use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use uuid::Uuid;

use super::abort::AbortRegistry;
use super::auth::{AuthInjector, AuthorizedRequest};
use super::diagnostics::{
    DiagnosticRecord, DiagnosticsSink, LogUnauthorized, TracingSink, UnauthorizedHandler,
};
use super::error::{ApiError, ErrorKind};
use super::retry::RetryPolicy;
use super::signer::RequestSigner;
use crate::models::{normalize_path, HttpMethod, Project, QueryParams, RequestDescriptor};
use crate::session::SessionStateStore;

/// Connectivity probe; failures here are never escalated
pub const HEALTH_PATH: &str = "health";

/// Paths whose 401 goes back to the caller instead of forcing a new login
pub const SKIP_UNAUTHORIZED_PATHS: &[&str] = &["profiles/pin"];

/// Statuses classified as not-found-or-transient
const TRANSIENT_STATUSES: &[u16] = &[404, 408, 429, 502, 503, 504];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Full URL the request was sent to (abort registry key)
    pub url: String,
    /// Parsed JSON body; `Null` for an empty body
    pub body: Value,
}

/// Storefront API client
pub struct HttpClient {
    base_url: String,
    client: reqwest::Client,
    signer: RequestSigner,
    auth: AuthInjector,
    aborts: AbortRegistry,
    retry: RetryPolicy,
    diagnostics: Arc<dyn DiagnosticsSink>,
    unauthorized: Arc<dyn UnauthorizedHandler>,
}

impl HttpClient {
    /// Create a client for `base_url` acting as `project`
    pub fn new(
        base_url: impl Into<String>,
        project: Project,
        session: Arc<dyn SessionStateStore>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_transport(DEFAULT_TIMEOUT),
            signer: RequestSigner::new(project),
            auth: AuthInjector::new(project, session),
            aborts: AbortRegistry::new(),
            retry: RetryPolicy::default(),
            diagnostics: Arc::new(TracingSink),
            unauthorized: Arc::new(LogUnauthorized),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_transport(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.unauthorized = handler;
        self
    }

    pub fn aborts(&self) -> &AbortRegistry {
        &self.aborts
    }

    /// Cancel every in-flight request. The client stays usable.
    pub fn abort_all_requests(&self) {
        debug!(in_flight = self.aborts.len(), "aborting all requests");
        self.aborts.abort_all();
    }

    pub async fn get(&self, path: &str, query: QueryParams) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::get(path).with_query(query))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::put(path).with_body(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(RequestDescriptor::delete(path)).await
    }

    /// Run one request through the full pipeline
    pub async fn send(&self, mut request: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        request.path = normalize_path(&request.path).to_string();

        if request.method == HttpMethod::Get {
            request.query = self
                .signer
                .augment(&request.path, request.method, &request.query);
        }

        let authorized = self.auth.decorate(request);

        let url = match self.build_url(&authorized.request) {
            Ok(url) => url,
            Err(err) => {
                error!(path = %authorized.request.path, "request rejected before dispatch: {}", err);
                return Err(err);
            }
        };

        let path = authorized.request.path.clone();
        let exempt = AbortRegistry::is_exempt(&path);
        let token = if exempt {
            self.aborts.detached()
        } else {
            self.aborts.register(&url)
        };

        let mut attempt = 1;
        let result = loop {
            match self.dispatch(&authorized, &url, &token).await {
                Err(err) if self.retry.should_retry(&err, attempt) => {
                    let wait = self.retry.delay(attempt);
                    debug!(url = %url, attempt, ?wait, "retrying after {}", err);
                    tokio::select! {
                        _ = token.cancelled() => break Err(ApiError::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                    attempt += 1;
                }
                other => break other,
            }
        };

        if !exempt {
            self.aborts.release(&url);
        }

        result.map_err(|err| self.escalate(authorized.request.method, &path, &url, err))
    }

    fn build_url(&self, request: &RequestDescriptor) -> Result<String, ApiError> {
        let mut url = format!("{}/{}", self.base_url, request.path);
        if !request.query.is_empty() {
            url.push('?');
            url.push_str(&request.query.to_query_string());
        }
        reqwest::Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(url)
    }

    async fn dispatch(
        &self,
        authorized: &AuthorizedRequest,
        url: &str,
        token: &CancellationToken,
    ) -> Result<ApiResponse, ApiError> {
        let request = &authorized.request;
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        }
        .header("Accept", "application/json");

        if let Some(auth) = authorized.authorization() {
            builder = builder.header("Authorization", auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, ApiError>((status, text))
        };

        let (status, text) = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ApiError::Cancelled),
            result = exchange => result?,
        };

        if status.is_success() {
            let body = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    ApiError::InvalidResponse(format!("JSON parse error: {}", e))
                })?
            };
            return Ok(ApiResponse {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Err(classify_status(status, parse_error_body(&text)))
    }

    /// Login redirect and diagnostics for a failed request
    fn escalate(&self, method: HttpMethod, path: &str, url: &str, err: ApiError) -> ApiError {
        if err.kind() == ErrorKind::Cancelled {
            debug!(url = %url, "request cancelled");
            return err;
        }

        if err.kind() == ErrorKind::Unauthorized && !skips_unauthorized_check(path) {
            self.unauthorized.on_unauthorized(path);
        }

        if path != HEALTH_PATH {
            self.diagnostics.record(DiagnosticRecord {
                id: Uuid::new_v4(),
                kind: err.kind(),
                method,
                path: path.to_string(),
                url: url.to_string(),
                status: err.status(),
                message: err.to_string(),
                body: err.body().cloned(),
            });
        }

        err
    }
}

fn build_transport(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

fn skips_unauthorized_check(path: &str) -> bool {
    SKIP_UNAUTHORIZED_PATHS.iter().any(|p| path.contains(p))
}

fn classify_status(status: StatusCode, body: Option<Value>) -> ApiError {
    let code = status.as_u16();
    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized { body }
    } else if TRANSIENT_STATUSES.contains(&code) {
        ApiError::NotFoundOrTransient { status: code, body }
    } else {
        ApiError::Api { status: code, body }
    }
}

/// Error bodies are passed through as JSON when possible, raw text otherwise
fn parse_error_body(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;
    use serde_json::json;

    fn client(base: &str, project: Project) -> HttpClient {
        HttpClient::new(base, project, Arc::new(MemorySession::new()))
    }

    #[test]
    fn test_build_url_with_query() {
        let client = client("https://api.example.tv/v1/", Project::Standard);
        let req = RequestDescriptor::get("/content/items")
            .with_query(QueryParams::new().with("genre", "sci fi").with("page", "0"));
        assert_eq!(
            client.build_url(&req).unwrap(),
            "https://api.example.tv/v1/content/items?genre=sci%20fi&page=0"
        );
    }

    #[test]
    fn test_build_url_without_query() {
        let client = client("https://api.example.tv", Project::Standard);
        let req = RequestDescriptor::get("health");
        assert_eq!(client.build_url(&req).unwrap(), "https://api.example.tv/health");
    }

    #[test]
    fn test_build_url_rejects_garbage_base() {
        let client = client("not a url", Project::Standard);
        assert!(matches!(
            client.build_url(&RequestDescriptor::get("health")),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None),
            ApiError::Unauthorized { .. }
        ));
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, None).kind(),
            ErrorKind::NotFoundOrTransient
        );
        assert_eq!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, None).kind(),
            ErrorKind::NotFoundOrTransient
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, None).kind(),
            ErrorKind::GenericApiError
        );
    }

    #[test]
    fn test_parse_error_body() {
        assert_eq!(parse_error_body(""), None);
        assert_eq!(parse_error_body(r#"{"code":"X"}"#), Some(json!({"code": "X"})));
        assert_eq!(parse_error_body("Bad Gateway"), Some(json!("Bad Gateway")));
    }

    #[test]
    fn test_skip_unauthorized_paths() {
        assert!(skips_unauthorized_check("profiles/pin"));
        assert!(!skips_unauthorized_check("profiles"));
    }
}
