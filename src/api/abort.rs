//! Per-URL cancellation handles for in-flight requests

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

/// Paths that are never individually cancellable
pub const ABORT_EXEMPT_PATHS: &[&str] = &[
    "favourites",
    "recently-watched",
    "progress",
    "recent-search",
    "login",
    "device-code",
    "config/entries",
    "request/entries",
];

#[derive(Debug)]
struct Inner {
    root: CancellationToken,
    handles: HashMap<String, CancellationToken>,
}

/// Tracks one cancellation token per request URL.
///
/// Re-registering a URL replaces the stored token without cancelling the old
/// one (last writer wins). Every token, registered or detached, is a child of
/// a root token that `abort_all` cancels and then replaces.
#[derive(Debug)]
pub struct AbortRegistry {
    inner: Mutex<Inner>,
}

impl AbortRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                root: CancellationToken::new(),
                handles: HashMap::new(),
            }),
        }
    }

    /// Whether requests to `path` skip registration
    pub fn is_exempt(path: &str) -> bool {
        ABORT_EXEMPT_PATHS.iter().any(|p| path.contains(p))
    }

    pub fn register(&self, url: &str) -> CancellationToken {
        let mut inner = self.lock();
        let token = inner.root.child_token();
        inner.handles.insert(url.to_string(), token.clone());
        token
    }

    /// Token for an exempt request; only `abort_all` can cancel it
    pub fn detached(&self) -> CancellationToken {
        self.lock().root.child_token()
    }

    pub fn release(&self, url: &str) {
        self.lock().handles.remove(url);
    }

    pub fn abort_all(&self) {
        let mut inner = self.lock();
        for token in inner.handles.values() {
            token.cancel();
        }
        inner.handles.clear();
        inner.root.cancel();
        inner.root = CancellationToken::new();
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().handles.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Guarded data stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for AbortRegistry {
    fn default() -> Self {
        Self::new()
    }
}
