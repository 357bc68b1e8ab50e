//! Auth gate handlers.
//!
//! ```text
//! POST /api/v1/auth {"mode":"signIn","email":"ada@example.com","password":"..."}
//! GET  /api/v1/session
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AuthCredentials, AuthMode, AuthValidationError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/auth`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default)]
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
}

/// Which screen the client should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum View {
    AuthGate,
    VowForm,
}

/// Response body for `POST /api/v1/auth`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Status line shown under the form.
    #[schema(example = "✅ Success! You are now logged in.")]
    pub message: String,
    /// Whether a session was established.
    pub logged_in: bool,
    pub view: View,
}

/// Response body for `GET /api/v1/session`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub email: Option<String>,
    pub user_id: Option<String>,
    pub view: View,
}

impl TryFrom<&AuthRequest> for AuthCredentials {
    type Error = AuthValidationError;

    fn try_from(value: &AuthRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_validation_error(err: AuthValidationError) -> Error {
    match err {
        AuthValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })),
        AuthValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Sign up or sign in against the hosted auth service.
///
/// Any returned session is stored in the session cookie, including one
/// issued by a sign-up the service auto-confirmed. Sign-up always asks the
/// user to verify their email.
#[utoipa::path(
    post,
    path = "/api/v1/auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Auth accepted", body = AuthResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request or sign-up rejected", body = Error),
        (status = 401, description = "Sign-in rejected", body = Error),
        (status = 503, description = "Auth service unreachable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "authenticate",
    security([])
)]
#[post("/auth")]
pub async fn authenticate(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AuthRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let request = payload.into_inner();
    let credentials = AuthCredentials::try_from(&request).map_err(map_validation_error)?;
    let outcome = state
        .auth_gate
        .authenticate(request.mode, &credentials)
        .await?;

    let logged_in = match outcome.session() {
        Some(backend_session) => {
            session.persist_session(backend_session)?;
            true
        }
        None => false,
    };
    Ok(web::Json(AuthResponse {
        message: outcome.message().to_owned(),
        logged_in,
        view: if logged_in { View::VowForm } else { View::AuthGate },
    }))
}

/// Report the current session and the view to render.
///
/// An expired access token is refreshed first; one that cannot be refreshed
/// clears the cookie and reports the auth gate.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentSession",
    security([])
)]
#[get("/session")]
pub async fn current_session(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionResponse>> {
    let response = match session.active_session(state.auth_gate.as_ref()).await? {
        Some(current) => SessionResponse {
            authenticated: true,
            email: current.email,
            user_id: Some(current.user_id.to_string()),
            view: View::VowForm,
        },
        None => SessionResponse {
            authenticated: false,
            email: None,
            user_id: None,
            view: View::AuthGate,
        },
    };
    Ok(web::Json(response))
}
