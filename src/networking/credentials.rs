//! Bearer credential seam
//!
//! The OAuth handshake itself happens outside this crate; the pipeline
//! only needs something that can hand it a currently-valid bearer
//! token. Token refresh, secure storage and the browser dance are the
//! embedding application's problem.

use async_trait::async_trait;

use super::LoadResult;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return a bearer token believed to be valid right now.
    ///
    /// Providers must not block on interactive flows; if no token is
    /// available they should return `LoadError::AuthExpired` so the
    /// caller can surface the re-authentication requirement.
    async fn bearer_token(&self) -> LoadResult<String>;
}

/// Fixed-token provider for tools and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> LoadResult<String> {
        Ok(self.token.clone())
    }
}
