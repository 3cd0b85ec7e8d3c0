//! Data structures and types for StreamFront
//!
//! Contains the shared models used across the network core, organized by domain:
//! - **Requests**: methods, ordered query parameters, request descriptors
//! - **Projects**: deployment identity and the credential it selects
//! - **Components**: declarative content descriptors from the UI layer
//! - **Results**: normalized content envelopes and fetch outcomes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::api::ErrorKind;
use crate::session::keys;

// =============================================================================
// Request Models
// =============================================================================

/// HTTP verbs the storefront backend is called with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Ordered string-to-string query parameters.
///
/// Insertion order is significant: cache keys and request URLs are built by
/// walking the pairs in order. Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` on top of `self`
    pub fn merge(&mut self, other: &QueryParams) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    /// URL-encoded `k=v&k2=v2` form
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// A single outbound call, before the client adds base URL, signing and auth.
///
/// `path` is always relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub query: QueryParams,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: normalize_path(&path.into()).to_string(),
            query: QueryParams::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Strip leading slashes so paths compare the same with or without them
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

// =============================================================================
// Project Models
// =============================================================================

/// Deployment the storefront is built for.
///
/// Fixed at configuration time; selects parameter policies and which session
/// credential is sent as the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Project {
    #[default]
    Standard,
    Operator,
    Partner,
}

/// Which session credential a request carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Token of the currently selected viewer profile
    Profile,
    /// Token of the account holder
    Consumer,
}

impl TokenKind {
    /// Session store key holding this token
    pub fn session_key(&self) -> &'static str {
        match self {
            TokenKind::Profile => keys::PROFILE_TOKEN,
            TokenKind::Consumer => keys::CONSUMER_TOKEN,
        }
    }
}

impl Project {
    /// Credential attached to ordinary authenticated requests
    pub fn token_kind(&self) -> TokenKind {
        match self {
            Project::Operator => TokenKind::Consumer,
            Project::Standard | Project::Partner => TokenKind::Profile,
        }
    }

    /// Credential attached to `subscription/status`
    pub fn subscription_token(&self) -> TokenKind {
        match self {
            Project::Operator => TokenKind::Profile,
            Project::Standard | Project::Partner => TokenKind::Consumer,
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Project::Standard => write!(f, "standard"),
            Project::Operator => write!(f, "operator"),
            Project::Partner => write!(f, "partner"),
        }
    }
}

impl FromStr for Project {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Project::Standard),
            "operator" => Ok(Project::Operator),
            "partner" => Ok(Project::Partner),
            other => Err(format!("Unknown project: {}", other)),
        }
    }
}

// =============================================================================
// Component Models
// =============================================================================

/// Declared type of a UI component's data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    FeedId,
    Calendar,
    Highlights,
    Archive,
    Listing,
    ListingParams,
    Recommendation,
    /// Anything the backend sends that we don't fetch for
    Other(String),
}

impl From<String> for ComponentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "FEED_ID" => ComponentKind::FeedId,
            "CALENDAR" => ComponentKind::Calendar,
            "HIGHLIGHTS" => ComponentKind::Highlights,
            "ARCHIVE" => ComponentKind::Archive,
            "LISTING" => ComponentKind::Listing,
            "LISTING_PARAMS" => ComponentKind::ListingParams,
            "RECOMMENDATION" => ComponentKind::Recommendation,
            _ => ComponentKind::Other(s),
        }
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::FeedId => "FEED_ID",
            ComponentKind::Calendar => "CALENDAR",
            ComponentKind::Highlights => "HIGHLIGHTS",
            ComponentKind::Archive => "ARCHIVE",
            ComponentKind::Listing => "LISTING",
            ComponentKind::ListingParams => "LISTING_PARAMS",
            ComponentKind::Recommendation => "RECOMMENDATION",
            ComponentKind::Other(name) => name,
        };
        write!(f, "{}", name)
    }
}

/// What a UI component wants shown, as sent by the CMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// Endpoint hint, e.g. `filter://1234`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curated_data: Option<Vec<Value>>,
    /// Presentation fields (title, layout, ...) carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentDescriptor {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            data: None,
            params: Map::new(),
            curated_data: None,
            extra: Map::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Declared params as query strings, in declaration order.
    ///
    /// Nulls are dropped; scalars are stringified; arrays are comma-joined.
    pub fn query_params(&self) -> QueryParams {
        self.params
            .iter()
            .filter_map(|(k, v)| param_string(v).map(|s| (k.clone(), s)))
            .collect()
    }
}

fn param_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(param_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// Result Models
// =============================================================================

/// Uniform shape returned for every component, whatever its source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEnvelope {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentEnvelope {
    /// Empty result flagged as failed
    pub fn error() -> Self {
        Self {
            status: Some("Error".to_string()),
            ..Self::default()
        }
    }
}

/// Result of a service call that never raises for expected failures
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Data arrived (from network, cache, or inline)
    Ready(T),
    /// Nothing to show, and nothing went wrong
    Empty,
    /// The call failed; the kind says why
    Failed(ErrorKind),
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    /// Data if ready, `None` for empty or failed
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Empty | Outcome::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(f(value)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(kind) => Outcome::Failed(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_replace_keeps_position() {
        let mut params = QueryParams::new().with("a", "1").with("b", "2");
        params.insert("a", "3");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_query_string_is_encoded() {
        let params = QueryParams::new().with("q", "blade runner").with("page", "0");
        assert_eq!(params.to_query_string(), "q=blade%20runner&page=0");
    }

    #[test]
    fn test_component_kind_wire_names() {
        let kind: ComponentKind = serde_json::from_value(json!("LISTING_PARAMS")).unwrap();
        assert_eq!(kind, ComponentKind::ListingParams);

        let other: ComponentKind = serde_json::from_value(json!("BANNER")).unwrap();
        assert_eq!(other, ComponentKind::Other("BANNER".into()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("BANNER"));
    }

    #[test]
    fn test_descriptor_params_stringified() {
        let descriptor: ComponentDescriptor = serde_json::from_value(json!({
            "type": "LISTING",
            "params": {"genre": "action", "year": 2020, "tags": ["a", "b"], "skip": null}
        }))
        .unwrap();

        let params = descriptor.query_params();
        assert_eq!(params.get("genre"), Some("action"));
        assert_eq!(params.get("year"), Some("2020"));
        assert_eq!(params.get("tags"), Some("a,b"));
        assert!(!params.contains_key("skip"));
    }

    #[test]
    fn test_descriptor_keeps_presentation_fields() {
        let raw = json!({"type": "ARCHIVE", "title": "Past games", "layout": "grid"});
        let descriptor: ComponentDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(descriptor.extra.get("title"), Some(&json!("Past games")));
        assert_eq!(serde_json::to_value(&descriptor).unwrap(), raw);
    }

    #[test]
    fn test_project_token_selection() {
        assert_eq!(Project::Operator.token_kind(), TokenKind::Consumer);
        assert_eq!(Project::Standard.token_kind(), TokenKind::Profile);
        assert_eq!(Project::Operator.subscription_token(), TokenKind::Profile);
        assert_eq!(Project::Partner.subscription_token(), TokenKind::Consumer);
        assert_eq!("Operator".parse::<Project>(), Ok(Project::Operator));
        assert!("nope".parse::<Project>().is_err());
    }

    #[test]
    fn test_request_path_normalized() {
        let req = RequestDescriptor::get("/content/items");
        assert_eq!(req.path, "content/items");
    }
}
