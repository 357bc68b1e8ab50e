//! Vow form handlers.
//!
//! ```text
//! GET  /api/v1/vows/form
//! POST /api/v1/vows {"firstName":"Ada","surname":"Lovelace",...,"amount":"2500"}
//! ```
//!
//! Both return the form state to render: a single status line plus the form
//! values (cleared after a successful submission).

use actix_web::{HttpResponse, get, http::StatusCode, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, VowForm, VowSubmissionOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Initial form state: empty values and an empty status line.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VowFormState {
    pub message: String,
    pub form: VowForm,
}

/// Render the empty vow form.
#[utoipa::path(
    get,
    path = "/api/v1/vows/form",
    responses((status = 200, description = "Empty form", body = VowFormState)),
    tags = ["vows"],
    operation_id = "vowForm",
    security([])
)]
#[get("/vows/form")]
pub async fn vow_form() -> web::Json<VowFormState> {
    web::Json(VowFormState::default())
}

/// Submit the vow form.
///
/// Returns `201` when the backend stored the row and `502` when it rejected
/// it; either way the body is the form state to render.
#[utoipa::path(
    post,
    path = "/api/v1/vows",
    request_body = VowForm,
    responses(
        (status = 201, description = "Vow stored; form cleared", body = VowSubmissionOutcome),
        (status = 502, description = "Backend rejected the vow; form kept", body = VowSubmissionOutcome),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["vows"],
    operation_id = "submitVow",
    security([])
)]
#[post("/vows")]
pub async fn submit_vow(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VowForm>,
) -> ApiResult<HttpResponse> {
    let current = session.active_session(state.auth_gate.as_ref()).await?;
    let outcome = state.vows.submit(current.as_ref(), payload.into_inner()).await;
    let status = if outcome.success {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok(HttpResponse::build(status).json(outcome))
}
