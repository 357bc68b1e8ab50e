//! Failure reported by any call to the hosted backend, plus the identity a
//! call is made under.
//!
//! The backend's own message is kept verbatim; callers classify failures by
//! matching on that text, never on a richer taxonomy.

use super::define_port_error;
use crate::domain::{AccessToken, BackendSession};

/// Error code PostgREST returns when a single-row read finds no rows.
pub const NO_ROWS_CODE: &str = "PGRST116";

define_port_error! {
    /// Errors surfaced by backend adapters.
    pub enum BackendError {
        /// The backend answered with an error payload.
        Rejected { status: u16, code: String, message: String } => "{message}",
        /// The request failed before a response arrived.
        Transport { message: String } => "{message}",
        /// A response arrived but could not be decoded.
        Decode { message: String } => "{message}",
    }
}

impl BackendError {
    /// Message shown to users, verbatim from the backend where available.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message, .. }
            | Self::Transport { message }
            | Self::Decode { message } => message.as_str(),
        }
    }

    /// Backend error code, when the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } if !code.is_empty() => Some(code.as_str()),
            _ => None,
        }
    }

    /// Whether the message says the relation (or another object) is missing.
    ///
    /// # Examples
    /// ```
    /// use vows_backend::domain::ports::BackendError;
    ///
    /// let err = BackendError::rejected(404_u16, "42P01", r#"relation "public.vows" does not exist"#);
    /// assert!(err.reports_missing_object());
    /// assert!(!BackendError::transport("connection refused").reports_missing_object());
    /// ```
    pub fn reports_missing_object(&self) -> bool {
        self.message().contains("does not exist")
    }
}

/// Identity a backend call is made under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    /// No session: calls carry only the anonymous key.
    #[default]
    Anonymous,
    /// Calls carry the signed-in user's access token.
    User(AccessToken),
}

impl Caller {
    /// Derive the caller from the current session, if any.
    pub fn from_session(session: Option<&BackendSession>) -> Self {
        session.map_or(Self::Anonymous, |s| Self::User(s.access_token.clone()))
    }

    /// Token to present instead of the anonymous key.
    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Self::Anonymous => None,
            Self::User(token) => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BackendError::rejected(400_u16, "", "Invalid login credentials"), "Invalid login credentials")]
    #[case(BackendError::transport("error sending request"), "error sending request")]
    #[case(BackendError::decode("expected value at line 1"), "expected value at line 1")]
    fn display_is_the_verbatim_message(#[case] err: BackendError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.message(), expected);
    }

    #[rstest]
    fn empty_code_is_reported_as_absent() {
        assert_eq!(BackendError::rejected(500_u16, "", "boom").code(), None);
        assert_eq!(
            BackendError::rejected(406_u16, NO_ROWS_CODE, "no rows").code(),
            Some(NO_ROWS_CODE)
        );
    }
}
