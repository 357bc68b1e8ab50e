//! Shared reqwest plumbing for the Supabase adapters.
//!
//! Owns transport details only: URL construction, the `apikey` and bearer
//! headers, and mapping transport and status failures onto [`BackendError`].

use std::fmt;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::ErrorBodyDto;
use crate::domain::TraceId;
use crate::domain::ports::{BackendError, Caller};

const USER_AGENT: &str = concat!("vows-backend/", env!("CARGO_PKG_VERSION"));
const APIKEY_HEADER: &str = "apikey";

/// Client for one Supabase project.
///
/// Implements [`AuthProvider`](crate::domain::ports::AuthProvider),
/// [`VowRepository`](crate::domain::ports::VowRepository) and
/// [`SqlRpc`](crate::domain::ports::SqlRpc).
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    anon_key: String,
}

impl fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Build a client for the project at `base`, authorised by `anon_key`.
    ///
    /// No request timeout is set; reqwest's defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(mut base: Url, anon_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base,
            anon_key: anon_key.into(),
        })
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|err| BackendError::transport(format!("invalid backend URL for {path}: {err}")))
    }

    /// Start a request carrying the anon key and the caller's bearer token.
    pub(super) fn request(&self, method: Method, url: Url, caller: &Caller) -> RequestBuilder {
        let bearer = caller
            .access_token()
            .map_or(self.anon_key.as_str(), |token| token.expose());
        self.http
            .request(method, url)
            .header(APIKEY_HEADER, self.anon_key.as_str())
            .bearer_auth(bearer)
    }

    /// Send, read the whole body and map non-2xx statuses to errors.
    pub(super) async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(
            trace_id = ?TraceId::current().map(|id| id.to_string()),
            url = %response.url(),
            status = status.as_u16(),
            "backend responded"
        );
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(map_status_error(status, body.as_ref()))
        }
    }

    pub(super) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|err| {
            BackendError::decode(format!("invalid backend JSON payload: {err}"))
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> BackendError {
    BackendError::transport(error.to_string())
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let decoded: ErrorBodyDto = serde_json::from_slice(body).unwrap_or_default();
    let message = match decoded.message() {
        Some(message) => message.to_owned(),
        None => {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                format!("status {}: {preview}", status.as_u16())
            }
        }
    };
    BackendError::rejected(
        status.as_u16(),
        decoded.code().unwrap_or_default(),
        message,
    )
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
