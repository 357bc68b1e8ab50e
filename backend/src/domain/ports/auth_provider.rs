//! Driven port for the hosted auth service.
//!
//! The service owns credential storage and verification; this port only
//! forwards the credentials and reports the session it hands back.

use async_trait::async_trait;

use super::BackendError;
use crate::domain::{AccessToken, AuthCredentials, BackendSession, RefreshToken, UserId};

/// Port for account creation and password sign-in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account. Returns a session only when the service confirms
    /// accounts without email verification.
    async fn sign_up(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<Option<BackendSession>, BackendError>;

    /// Exchange email and password for a session.
    async fn sign_in_with_password(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<Option<BackendSession>, BackendError>;

    /// Exchange a refresh token for a new session. The service rotates the
    /// refresh token, so the old one must not be reused.
    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<Option<BackendSession>, BackendError>;
}

/// Email accepted by [`FixtureAuthProvider`].
pub const FIXTURE_EMAIL: &str = "admin@example.com";
/// Password accepted by [`FixtureAuthProvider`].
pub const FIXTURE_PASSWORD: &str = "password";
/// User id issued by [`FixtureAuthProvider`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
/// Refresh token issued and accepted by [`FixtureAuthProvider`].
pub const FIXTURE_REFRESH_TOKEN: &str = "fixture-refresh-token";

/// In-process stand-in used when no backend is configured.
///
/// Sign-up always requires verification; sign-in succeeds only for
/// [`FIXTURE_EMAIL`] / [`FIXTURE_PASSWORD`]. Fixture sessions never expire
/// but can be refreshed with [`FIXTURE_REFRESH_TOKEN`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

fn fixture_session() -> Result<BackendSession, BackendError> {
    let user_id = UserId::new(FIXTURE_USER_ID)
        .map_err(|err| BackendError::decode(format!("invalid fixture user id: {err}")))?;
    Ok(BackendSession {
        user_id,
        email: Some(FIXTURE_EMAIL.to_owned()),
        access_token: AccessToken::new("fixture-access-token"),
        refresh_token: Some(RefreshToken::new(FIXTURE_REFRESH_TOKEN)),
        expires_at: None,
    })
}

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn sign_up(
        &self,
        _credentials: &AuthCredentials,
    ) -> Result<Option<BackendSession>, BackendError> {
        Ok(None)
    }

    async fn sign_in_with_password(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<Option<BackendSession>, BackendError> {
        if credentials.email() != FIXTURE_EMAIL || credentials.password() != FIXTURE_PASSWORD {
            return Err(BackendError::rejected(
                400_u16,
                "invalid_credentials",
                "Invalid login credentials",
            ));
        }
        fixture_session().map(Some)
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<Option<BackendSession>, BackendError> {
        if refresh_token.expose() != FIXTURE_REFRESH_TOKEN {
            return Err(BackendError::rejected(
                400_u16,
                "refresh_token_not_found",
                "Invalid Refresh Token: Refresh Token Not Found",
            ));
        }
        fixture_session().map(Some)
    }
}
