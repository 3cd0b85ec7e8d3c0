//! StreamFront - network core of a smart-TV streaming storefront
//!
//! Everything between the UI components and the storefront backend:
//! the outbound request pipeline, response caching, and the services that
//! turn component descriptors into content.
//!
//! # Modules
//!
//! - `models` - Requests, projects, component descriptors, envelopes
//! - `api` - HTTP client pipeline (signing, auth, cancellation, errors)
//! - `cache` - Response cache keyed by request signature
//! - `services` - Content, playback and connectivity services
//! - `session` - Session state shared with the UI
//! - `context` - Application context wiring it all together

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod models;
pub mod services;
pub mod session;

// Re-export commonly used types
pub use models::{
    ComponentDescriptor, ComponentKind, ContentEnvelope, HttpMethod, Outcome, Project,
    QueryParams, RequestDescriptor,
};

pub use api::{ApiError, ErrorKind, HttpClient};
pub use cache::{CacheTtl, ResponseCache};
pub use config::Config;
pub use context::Storefront;
pub use services::{ContentService, PlaybackService};
