//! Auth gate use-case: forwards credentials to the hosted auth service and
//! phrases the result for the user.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::{debug, info, warn};

use super::ports::{AuthGate, AuthProvider, BackendError};
use super::{AuthCredentials, AuthMode, AuthOutcome, BackendSession, Error, SessionResumption};

/// [`AuthGate`] implementation backed by an [`AuthProvider`].
#[derive(Clone)]
pub struct AuthGateService {
    provider: Arc<dyn AuthProvider>,
    clock: Arc<dyn Clock>,
}

impl AuthGateService {
    /// Build the service around an auth provider, reading the system clock.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the clock used for session expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl AuthGate for AuthGateService {
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &AuthCredentials,
    ) -> Result<AuthOutcome, Error> {
        let result = match mode {
            AuthMode::SignUp => self.provider.sign_up(credentials).await,
            AuthMode::SignIn => self.provider.sign_in_with_password(credentials).await,
        };

        match (mode, result) {
            (AuthMode::SignIn, Ok(Some(session))) => {
                info!(user_id = %session.user_id, "user signed in");
                Ok(AuthOutcome::LoggedIn(session))
            }
            (_, Ok(session)) => {
                info!(
                    ?mode,
                    confirmed = session.is_some(),
                    "auth accepted; verification pending"
                );
                Ok(AuthOutcome::VerificationPending(session))
            }
            (_, Err(err)) => {
                warn!(?mode, error = %err, "auth service rejected request");
                Err(map_auth_error(mode, &err))
            }
        }
    }

    async fn resume(&self, stored: BackendSession) -> SessionResumption {
        if !stored.is_expired_at(self.clock.utc()) {
            return SessionResumption::Current(stored);
        }
        let Some(refresh_token) = stored.refresh_token.as_ref() else {
            debug!(user_id = %stored.user_id, "session expired without a refresh token");
            return SessionResumption::Expired;
        };
        match self.provider.refresh_session(refresh_token).await {
            Ok(Some(session)) => {
                info!(user_id = %session.user_id, "session refreshed");
                SessionResumption::Refreshed(session)
            }
            Ok(None) => {
                warn!(user_id = %stored.user_id, "refresh returned no session");
                SessionResumption::Expired
            }
            Err(err) => {
                warn!(user_id = %stored.user_id, error = %err, "session refresh failed");
                SessionResumption::Expired
            }
        }
    }
}

fn map_auth_error(mode: AuthMode, err: &BackendError) -> Error {
    match err {
        BackendError::Rejected { status, .. } if (400..500).contains(status) => match mode {
            AuthMode::SignIn => Error::unauthorized(err.message()),
            AuthMode::SignUp => Error::invalid_request(err.message()),
        },
        _ => Error::service_unavailable(err.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FIXTURE_EMAIL, FIXTURE_PASSWORD, FixtureAuthProvider, MockAuthProvider,
    };
    use crate::domain::{AccessToken, ErrorCode, RefreshToken, UserId};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> AuthCredentials {
        AuthCredentials::try_from_parts("ada@example.com", "pw").expect("credentials")
    }

    fn session() -> BackendSession {
        BackendSession {
            user_id: UserId::random(),
            email: Some("ada@example.com".to_owned()),
            access_token: AccessToken::new("jwt"),
            refresh_token: None,
            expires_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn frozen_clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(now);
        Arc::new(clock)
    }

    fn stored(expires_in: Duration, refresh: Option<&str>) -> BackendSession {
        BackendSession {
            expires_at: Some(now() + expires_in),
            refresh_token: refresh.map(RefreshToken::new),
            ..session()
        }
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_prompts_for_verification(credentials: AuthCredentials) {
        let gate = AuthGateService::new(Arc::new(FixtureAuthProvider));
        let outcome = gate
            .authenticate(AuthMode::SignUp, &credentials)
            .await
            .expect("sign up");
        assert_eq!(outcome, AuthOutcome::VerificationPending(None));
        assert_eq!(
            outcome.message(),
            "✅ Success! Please check your email for verification."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_with_auto_confirm_keeps_the_issued_session(credentials: AuthCredentials) {
        let issued = session();
        let returned = issued.clone();
        let mut provider = MockAuthProvider::new();
        provider
            .expect_sign_up()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        let gate = AuthGateService::new(Arc::new(provider));

        let outcome = gate
            .authenticate(AuthMode::SignUp, &credentials)
            .await
            .expect("sign up");
        assert_eq!(
            outcome.message(),
            "✅ Success! Please check your email for verification."
        );
        assert_eq!(outcome.session(), Some(&issued));
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_with_session_reports_logged_in() {
        let gate = AuthGateService::new(Arc::new(FixtureAuthProvider));
        let creds =
            AuthCredentials::try_from_parts(FIXTURE_EMAIL, FIXTURE_PASSWORD).expect("credentials");
        let outcome = gate
            .authenticate(AuthMode::SignIn, &creds)
            .await
            .expect("sign in");
        assert_eq!(outcome.message(), "✅ Success! You are now logged in.");
        assert!(outcome.session().is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_without_session_prompts_for_verification(credentials: AuthCredentials) {
        let mut provider = MockAuthProvider::new();
        provider
            .expect_sign_in_with_password()
            .times(1)
            .returning(|_| Ok(None));
        let gate = AuthGateService::new(Arc::new(provider));

        let outcome = gate
            .authenticate(AuthMode::SignIn, &credentials)
            .await
            .expect("sign in");
        assert_eq!(outcome, AuthOutcome::VerificationPending(None));
    }

    #[rstest]
    #[case(AuthMode::SignIn, BackendError::rejected(400_u16, "", "Invalid login credentials"), ErrorCode::Unauthorized)]
    #[case(AuthMode::SignUp, BackendError::rejected(422_u16, "", "User already registered"), ErrorCode::InvalidRequest)]
    #[case(AuthMode::SignIn, BackendError::transport("error sending request"), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn failures_surface_the_backend_message_verbatim(
        credentials: AuthCredentials,
        #[case] mode: AuthMode,
        #[case] failure: BackendError,
        #[case] expected_code: ErrorCode,
    ) {
        let expected_message = failure.message().to_owned();
        let mut provider = MockAuthProvider::new();
        let sign_up_failure = failure.clone();
        provider
            .expect_sign_up()
            .returning(move |_| Err(sign_up_failure.clone()));
        provider
            .expect_sign_in_with_password()
            .returning(move |_| Err(failure.clone()));
        let gate = AuthGateService::new(Arc::new(provider));

        let err = gate
            .authenticate(mode, &credentials)
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), expected_code);
        assert_eq!(err.message(), expected_message);
    }

    #[rstest]
    #[tokio::test]
    async fn unexpired_sessions_are_used_as_is() {
        let mut provider = MockAuthProvider::new();
        provider.expect_refresh_session().never();
        let gate = AuthGateService::new(Arc::new(provider)).with_clock(frozen_clock());

        let current = stored(Duration::minutes(30), Some("refresh"));
        assert_eq!(
            gate.resume(current.clone()).await,
            SessionResumption::Current(current)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn expired_sessions_are_refreshed_with_the_stored_token() {
        let renewed = stored(Duration::hours(1), Some("rotated"));
        let returned = renewed.clone();
        let mut provider = MockAuthProvider::new();
        provider
            .expect_refresh_session()
            .withf(|token| token.expose() == "refresh")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        let gate = AuthGateService::new(Arc::new(provider)).with_clock(frozen_clock());

        let resumed = gate.resume(stored(Duration::seconds(-1), Some("refresh"))).await;
        assert_eq!(resumed, SessionResumption::Refreshed(renewed));
    }

    #[rstest]
    #[case(None, None)]
    #[case(
        Some("refresh"),
        Some(BackendError::rejected(400_u16, "refresh_token_not_found", "Invalid Refresh Token"))
    )]
    #[case(Some("refresh"), Some(BackendError::transport("error sending request")))]
    #[tokio::test]
    async fn expired_sessions_without_a_usable_refresh_are_signed_out(
        #[case] refresh: Option<&'static str>,
        #[case] failure: Option<BackendError>,
    ) {
        let mut provider = MockAuthProvider::new();
        provider.expect_refresh_session().returning(move |_| match &failure {
            Some(err) => Err(err.clone()),
            None => Ok(None),
        });
        let gate = AuthGateService::new(Arc::new(provider)).with_clock(frozen_clock());

        let resumed = gate.resume(stored(Duration::seconds(5), refresh)).await;
        assert_eq!(resumed, SessionResumption::Expired);
    }
}
