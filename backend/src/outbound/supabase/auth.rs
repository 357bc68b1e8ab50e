//! [`AuthProvider`] over the Supabase auth (GoTrue) endpoints.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use tracing::debug;

use super::client::SupabaseClient;
use super::dto::SessionDto;
use crate::domain::ports::{AuthProvider, BackendError, Caller};
use crate::domain::{AuthCredentials, BackendSession, RefreshToken};

const SIGN_UP_PATH: &str = "auth/v1/signup";
const PASSWORD_GRANT_PATH: &str = "auth/v1/token?grant_type=password";
const REFRESH_GRANT_PATH: &str = "auth/v1/token?grant_type=refresh_token";

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> From<&'a AuthCredentials> for CredentialsBody<'a> {
    fn from(value: &'a AuthCredentials) -> Self {
        Self {
            email: value.email(),
            password: value.password(),
        }
    }
}

impl SupabaseClient {
    fn auth_request(&self, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(path)?;
        Ok(self.request(Method::POST, url, &Caller::Anonymous))
    }

    async fn exchange(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<BackendSession>, BackendError> {
        let dto: SessionDto = self.send_json(request).await?;
        dto.into_session(Utc::now()).map_err(BackendError::decode)
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<Option<BackendSession>, BackendError> {
        let request = self
            .auth_request(SIGN_UP_PATH)?
            .json(&CredentialsBody::from(credentials));
        let session = self.exchange(request).await?;
        debug!(confirmed = session.is_some(), "sign-up accepted");
        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<Option<BackendSession>, BackendError> {
        let request = self
            .auth_request(PASSWORD_GRANT_PATH)?
            .json(&CredentialsBody::from(credentials));
        self.exchange(request).await
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<Option<BackendSession>, BackendError> {
        let request = self.auth_request(REFRESH_GRANT_PATH)?.json(&RefreshBody {
            refresh_token: refresh_token.expose(),
        });
        self.exchange(request).await
    }
}
