//! Recommendation collaborator
//!
//! The recommendation engine is a third-party service; the content service only
//! needs something that turns a request into a list of items.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::QueryParams;

/// What the component asked recommendations for
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    /// Scenario / placement id from the descriptor's `data`
    pub scenario: Option<String>,
    pub initiator_id: Option<String>,
    pub initiator_type: Option<String>,
    pub page: u32,
    pub size: u32,
    pub params: QueryParams,
}

/// Items returned by the recommendation engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItems {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, rename = "recommendationID", alias = "recommendationId")]
    pub recommendation_id: Option<String>,
}

#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn fetch_items(&self, request: RecommendationRequest) -> anyhow::Result<RecommendationItems>;
}
