//! Authentication primitives: credentials, the sign-in/sign-up toggle and the
//! session handed back by the hosted auth service.
//!
//! Credential checks themselves belong to the hosted service. The only local
//! rule is the form's `required` contract: neither field may be empty.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::UserId;

/// Which auth flow the gate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    /// Authenticate an existing account with email and password.
    #[default]
    SignIn,
    /// Create a new account; the service may require email verification.
    SignUp,
}

/// Domain error returned when the auth form is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing.
    EmptyEmail,
    /// Password was missing.
    EmptyPassword,
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Email and password submitted through the auth gate.
///
/// ## Invariants
/// - `email` is non-empty once trimmed; the trimmed value is kept.
/// - `password` is non-empty and kept verbatim.
///
/// # Examples
/// ```
/// use vows_backend::domain::AuthCredentials;
///
/// let creds = AuthCredentials::try_from_parts(" ada@example.com ", "hunter2").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "hunter2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl AuthCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }

        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used as the account login.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Bearer token issued by the auth service for an authenticated user.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw bearer token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Raw token value for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Single-use token exchanged for a fresh access token once it expires.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(Zeroizing<String>);

impl RefreshToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(<redacted>)")
    }
}

/// Head start given to refreshes so a token does not lapse mid-request.
pub const SESSION_EXPIRY_MARGIN: Duration = Duration::seconds(30);

/// Authenticated session returned by the auth service and kept in the
/// cookie session afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSession {
    /// Account identifier; becomes the vow's `user_id`.
    pub user_id: UserId,
    /// Account email, when the service reports one.
    pub email: Option<String>,
    /// Token authorising calls on the user's behalf.
    pub access_token: AccessToken,
    /// Token for renewing `access_token`, when the service issued one.
    pub refresh_token: Option<RefreshToken>,
    /// When `access_token` stops being accepted. `None` means no known expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl BackendSession {
    /// Whether the access token has expired, or will within
    /// [`SESSION_EXPIRY_MARGIN`], at `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use vows_backend::domain::{AccessToken, BackendSession, UserId};
    ///
    /// let now = Utc::now();
    /// let session = BackendSession {
    ///     user_id: UserId::random(),
    ///     email: None,
    ///     access_token: AccessToken::new("jwt"),
    ///     refresh_token: None,
    ///     expires_at: Some(now + Duration::seconds(10)),
    /// };
    /// assert!(session.is_expired_at(now));
    /// assert!(!session.is_expired_at(now - Duration::hours(1)));
    /// ```
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= now + SESSION_EXPIRY_MARGIN)
    }
}

/// Result of a successful auth gate submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Sign-in produced an active session.
    LoggedIn(BackendSession),
    /// The user is asked to verify their email. Sign-up against a service
    /// that auto-confirms accounts still carries the session it issued.
    VerificationPending(Option<BackendSession>),
}

impl AuthOutcome {
    /// Status line displayed by the auth gate.
    ///
    /// # Examples
    /// ```
    /// use vows_backend::domain::AuthOutcome;
    ///
    /// assert_eq!(
    ///     AuthOutcome::VerificationPending(None).message(),
    ///     "✅ Success! Please check your email for verification."
    /// );
    /// ```
    pub fn message(&self) -> &'static str {
        match self {
            Self::LoggedIn(_) => "✅ Success! You are now logged in.",
            Self::VerificationPending(_) => {
                "✅ Success! Please check your email for verification."
            }
        }
    }

    /// The session established by this outcome, if any.
    pub fn session(&self) -> Option<&BackendSession> {
        match self {
            Self::LoggedIn(session) => Some(session),
            Self::VerificationPending(session) => session.as_ref(),
        }
    }
}

/// What became of a stored session when it was checked before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResumption {
    /// The access token is still valid.
    Current(BackendSession),
    /// The access token had expired and was renewed.
    Refreshed(BackendSession),
    /// The access token expired and could not be renewed.
    Expired,
}
