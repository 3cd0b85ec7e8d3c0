//! Services the UI layer calls into
//!
//! - content: component data and detail pages, through the response cache
//! - connectivity: backend health probe
//! - playback: progress, favourites, PIN check, playback details
//! - recommendation: the external recommendation collaborator

pub mod connectivity;
pub mod content;
pub mod playback;
pub mod recommendation;

pub use connectivity::ConnectivityService;
pub use content::ContentService;
pub use playback::{PinCheck, PlaybackService};
pub use recommendation::{RecommendationItems, RecommendationProvider, RecommendationRequest};
