//! Driving port for the sign-in / sign-up gate.
//!
//! Inbound adapters call this port without knowing which auth backend is
//! wired, so handler tests can substitute the fixture provider.

use async_trait::async_trait;

use crate::domain::{
    AuthCredentials, AuthMode, AuthOutcome, BackendSession, Error, SessionResumption,
};

/// Domain use-case port for authentication.
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Run the selected flow. Failures carry the auth service's message
    /// verbatim.
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &AuthCredentials,
    ) -> Result<AuthOutcome, Error>;

    /// Check a stored session before use, refreshing an expired access
    /// token when the session holds a refresh token.
    async fn resume(&self, stored: BackendSession) -> SessionResumption;
}
