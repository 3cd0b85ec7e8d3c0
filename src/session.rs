//! Session state shared with the UI layer
//!
//! A plain key-value lookup (tokens, locale, feature flags). No transactional guarantees.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Well-known session keys
pub mod keys {
    pub const PROFILE_TOKEN: &str = "profileToken";
    pub const CONSUMER_TOKEN: &str = "consumerToken";
    pub const LOCALE: &str = "locale";
}

/// Synchronous session state lookup
pub trait SessionStateStore: Send + Sync {
    fn get_state(&self, key: &str) -> Option<Value>;
    fn set_state(&self, key: &str, value: Value);

    /// String value for `key`; empty strings count as absent
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get_state(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// In-process session store
#[derive(Debug, Default)]
pub struct MemorySession {
    state: RwLock<HashMap<String, Value>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set_state(key, value.into());
        self
    }
}

impl SessionStateStore for MemorySession {
    fn get_state(&self, key: &str) -> Option<Value> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_state(&self, key: &str, value: Value) {
        self.state
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }
}
