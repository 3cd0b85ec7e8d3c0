//! Outbound HTTP stack
//!
//! - signer: project-specific query parameters
//! - auth: bearer token selection
//! - abort: per-URL cancellation
//! - client: the request/response pipeline tying them together

pub mod abort;
pub mod auth;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod retry;
pub mod signer;

pub use abort::AbortRegistry;
pub use auth::AuthInjector;
pub use client::{ApiResponse, HttpClient};
pub use diagnostics::{DiagnosticRecord, DiagnosticsSink, UnauthorizedHandler};
pub use error::{ApiError, ErrorKind};
pub use retry::RetryPolicy;
pub use signer::RequestSigner;
