//! Bearer credential selection for outgoing requests

use std::sync::Arc;

use tracing::debug;

use crate::models::{normalize_path, Project, RequestDescriptor};
use crate::session::SessionStateStore;

/// Paths that never carry an Authorization header
pub const AUTH_SKIP_PATHS: &[&str] = &[
    "login",
    "device/code",
    "trusted-login",
    "location",
    "content",
    "config/entries",
    "request/entries",
];

/// Always authenticated, with a project-specific credential
pub const SUBSCRIPTION_STATUS_PATH: &str = "subscription/status";

/// A request together with the bearer token it should carry
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedRequest {
    pub request: RequestDescriptor,
    pub bearer: Option<String>,
}

impl AuthorizedRequest {
    /// `Authorization` header value, if any
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|t| format!("Bearer {}", t))
    }
}

/// Decides whether and which session token a request gets
pub struct AuthInjector {
    project: Project,
    session: Arc<dyn SessionStateStore>,
}

impl AuthInjector {
    pub fn new(project: Project, session: Arc<dyn SessionStateStore>) -> Self {
        Self { project, session }
    }

    pub fn is_skipped(path: &str) -> bool {
        let path = normalize_path(path);
        AUTH_SKIP_PATHS.iter().any(|p| path.contains(p))
    }

    pub fn decorate(&self, request: RequestDescriptor) -> AuthorizedRequest {
        let path = normalize_path(&request.path);

        let kind = if path == SUBSCRIPTION_STATUS_PATH {
            self.project.subscription_token()
        } else if Self::is_skipped(path) {
            return AuthorizedRequest {
                request,
                bearer: None,
            };
        } else {
            self.project.token_kind()
        };

        let bearer = self.session.get_string(kind.session_key());
        if bearer.is_none() {
            debug!(path = %path, key = kind.session_key(), "no session token, sending unauthenticated");
        }

        AuthorizedRequest { request, bearer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{keys, MemorySession};

    fn session_with_tokens() -> Arc<dyn SessionStateStore> {
        Arc::new(
            MemorySession::new()
                .with(keys::PROFILE_TOKEN, "profile-tok")
                .with(keys::CONSUMER_TOKEN, "consumer-tok"),
        )
    }

    #[test]
    fn test_skip_list_never_authorized() {
        let injector = AuthInjector::new(Project::Standard, session_with_tokens());
        for path in [
            "login",
            "device/code",
            "trusted-login",
            "location",
            "content/items",
            "content/filters/12",
            "config/entries",
            "request/entries",
        ] {
            let decorated = injector.decorate(RequestDescriptor::get(path));
            assert!(decorated.bearer.is_none(), "{} should be unauthenticated", path);
        }
    }

    #[test]
    fn test_profile_token_for_standard() {
        let injector = AuthInjector::new(Project::Standard, session_with_tokens());
        let decorated = injector.decorate(RequestDescriptor::get("favourites"));
        assert_eq!(decorated.authorization(), Some("Bearer profile-tok".into()));
    }

    #[test]
    fn test_consumer_token_for_operator() {
        let injector = AuthInjector::new(Project::Operator, session_with_tokens());
        let decorated = injector.decorate(RequestDescriptor::get("profiles"));
        assert_eq!(decorated.bearer.as_deref(), Some("consumer-tok"));
    }

    #[test]
    fn test_subscription_status_special_case() {
        let standard = AuthInjector::new(Project::Standard, session_with_tokens());
        let decorated = standard.decorate(RequestDescriptor::get("/subscription/status"));
        assert_eq!(decorated.bearer.as_deref(), Some("consumer-tok"));

        let operator = AuthInjector::new(Project::Operator, session_with_tokens());
        let decorated = operator.decorate(RequestDescriptor::get("subscription/status"));
        assert_eq!(decorated.bearer.as_deref(), Some("profile-tok"));
    }

    #[test]
    fn test_missing_token_is_not_an_error() {
        let injector = AuthInjector::new(Project::Standard, Arc::new(MemorySession::new()));
        let decorated = injector.decorate(RequestDescriptor::get("favourites"));
        assert!(decorated.bearer.is_none());
        assert!(decorated.authorization().is_none());
    }
}
