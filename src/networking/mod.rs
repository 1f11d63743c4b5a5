//! Remote API plumbing for the character pipeline
//!
//! Everything that talks to the platform lives here: the profile
//! endpoint, the geometry content endpoint, and the bearer-credential
//! seam. The manifest store chain builds on these clients but lives in
//! `crate::assets`.

pub mod credentials;
pub mod geometry;
pub mod profile;

// Re-export main types for convenience
pub use credentials::{CredentialProvider, StaticTokenProvider};
pub use geometry::{ContentGeometryClient, GeometryBundle, GeometryFetcher, GeometryOptions};
pub use profile::{BungieProfileClient, ComponentType, ProfileFetcher, ProfileSnapshot};

// Error types
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("Character {character_id} not present in profile snapshot")]
    MissingCharacter { character_id: String },

    #[error("Manifest unreachable: {reason}")]
    ManifestUnavailable { reason: String },

    #[error("Malformed skeleton: {reason}")]
    MalformedSkeleton { reason: String },

    #[error("Bearer credential rejected, re-authentication required")]
    AuthExpired,

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Payload decode failed: {reason}")]
    Decode { reason: String },

    #[error("No equipment piece could be loaded")]
    NothingLoaded,
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Whether this error aborts a whole character load. Non-fatal
    /// errors are caught at the item boundary and the remaining
    /// equipment keeps loading.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LoadError::MissingCharacter { .. }
                | LoadError::ManifestUnavailable { .. }
                | LoadError::AuthExpired
        )
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Transport { reason: err.to_string() }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.status().map(|s| s.as_u16()) == Some(401) {
            LoadError::AuthExpired
        } else if err.is_decode() {
            LoadError::Decode { reason: err.to_string() }
        } else {
            LoadError::Transport { reason: err.to_string() }
        }
    }
}
