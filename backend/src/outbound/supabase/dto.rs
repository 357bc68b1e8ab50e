//! DTOs for decoding Supabase auth and PostgREST responses.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{AccessToken, BackendSession, RefreshToken, UserId};

/// Error body shared by GoTrue and PostgREST.
///
/// PostgREST sends `{code, message, details, hint}`; GoTrue sends either
/// `{code, error_code, msg}` or the older `{error, error_description}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ErrorBodyDto {
    code: Option<Value>,
    error_code: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBodyDto {
    /// The user-facing message, in the order the JS client picks it.
    pub(super) fn message(&self) -> Option<&str> {
        [
            &self.message,
            &self.msg,
            &self.error_description,
            &self.error,
        ]
        .into_iter()
        .find_map(|field| field.as_deref().filter(|text| !text.is_empty()))
    }

    /// Textual error code; numeric GoTrue codes are HTTP statuses and are
    /// skipped in favour of `error_code`.
    pub(super) fn code(&self) -> Option<&str> {
        match &self.code {
            Some(Value::String(code)) => Some(code.as_str()),
            _ => self.error_code.as_deref(),
        }
    }
}

/// Session (or bare user) returned by sign-up and the token grants.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SessionDto {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    expires_in: Option<i64>,
    /// Absolute expiry as a Unix timestamp; preferred over `expires_in`.
    expires_at: Option<i64>,
    user: Option<UserDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SessionDto {
    /// `None` when the service returned no access token (verification
    /// pending). `now` anchors a relative `expires_in`.
    pub(super) fn into_session(self, now: DateTime<Utc>) -> Result<Option<BackendSession>, String> {
        let Some(token) = self.access_token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let user = self
            .user
            .ok_or_else(|| "session response is missing the user".to_owned())?;
        let user_id =
            UserId::new(&user.id).map_err(|err| format!("invalid user id {:?}: {err}", user.id))?;
        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => Some(
                DateTime::from_timestamp(at, 0)
                    .ok_or_else(|| format!("expires_at {at} is out of range"))?,
            ),
            (None, Some(seconds)) => Some(now + Duration::seconds(seconds)),
            (None, None) => None,
        };
        Ok(Some(BackendSession {
            user_id,
            email: user.email,
            access_token: AccessToken::new(token),
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(RefreshToken::new),
            expires_at,
        }))
    }
}
