//! Diagnostics panel handlers.
//!
//! ```text
//! GET  /api/v1/diagnostics/connectivity
//! GET  /api/v1/diagnostics/schema
//! POST /api/v1/diagnostics/schema/test-record
//! POST /api/v1/diagnostics/table
//! ```
//!
//! Every probe runs under the caller's session token when one is stored.
//! All four answer `404` when the panel is disabled.

use std::sync::Arc;

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{Caller, Diagnostics};
use crate::domain::{
    AuthStatus, ConnectivityReport, Error, SchemaStatus, TableCreationOutcome, TestRecordOutcome,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Connectivity report plus the auth status of the caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityResponse {
    #[serde(flatten)]
    pub report: ConnectivityReport,
    pub auth_status: AuthStatus,
    /// Human-readable form of `authStatus`.
    #[schema(example = "Not logged in")]
    pub auth_line: String,
}

fn panel(state: &HttpState) -> ApiResult<Arc<dyn Diagnostics>> {
    state
        .diagnostics
        .clone()
        .ok_or_else(|| Error::not_found("diagnostics are disabled"))
}

async fn caller_of(state: &HttpState, session: &SessionContext) -> ApiResult<Caller> {
    let current = session.active_session(state.auth_gate.as_ref()).await?;
    Ok(Caller::from_session(current.as_ref()))
}

/// Test connectivity and report the caller's auth status.
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics/connectivity",
    responses(
        (status = 200, description = "Connectivity report", body = ConnectivityResponse),
        (status = 404, description = "Diagnostics disabled", body = Error)
    ),
    tags = ["diagnostics"],
    operation_id = "testConnectivity",
    security([])
)]
#[get("/diagnostics/connectivity")]
pub async fn connectivity(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ConnectivityResponse>> {
    let diagnostics = panel(&state)?;
    let current = session.active_session(state.auth_gate.as_ref()).await;
    let caller = match &current {
        Ok(stored) => Caller::from_session(stored.as_ref()),
        Err(_) => Caller::Anonymous,
    };
    let auth_status = match current {
        Ok(Some(stored)) => AuthStatus::LoggedIn {
            email: stored.email,
        },
        Ok(None) => AuthStatus::NotLoggedIn,
        Err(err) => AuthStatus::Failed {
            message: err.message().to_owned(),
        },
    };
    let report = diagnostics.connectivity(&caller).await;
    Ok(web::Json(ConnectivityResponse {
        report,
        auth_line: auth_status.line(),
        auth_status,
    }))
}

/// Check whether the vows relation exists.
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics/schema",
    responses(
        (status = 200, description = "Schema status", body = SchemaStatus),
        (status = 404, description = "Diagnostics disabled", body = Error)
    ),
    tags = ["diagnostics"],
    operation_id = "schemaStatus",
    security([])
)]
#[get("/diagnostics/schema")]
pub async fn schema_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SchemaStatus>> {
    let diagnostics = panel(&state)?;
    let caller = caller_of(&state, &session).await?;
    Ok(web::Json(diagnostics.schema_status(&caller).await))
}

/// Insert a placeholder row, then re-check once.
#[utoipa::path(
    post,
    path = "/api/v1/diagnostics/schema/test-record",
    responses(
        (status = 200, description = "Insert outcome and re-check", body = TestRecordOutcome),
        (status = 404, description = "Diagnostics disabled", body = Error)
    ),
    tags = ["diagnostics"],
    operation_id = "createTestRecord",
    security([])
)]
#[post("/diagnostics/schema/test-record")]
pub async fn create_test_record(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TestRecordOutcome>> {
    let diagnostics = panel(&state)?;
    let caller = caller_of(&state, &session).await?;
    Ok(web::Json(diagnostics.create_test_record(&caller).await))
}

/// Create the vows relation through `exec_sql`, with an insert fallback.
#[utoipa::path(
    post,
    path = "/api/v1/diagnostics/table",
    responses(
        (status = 200, description = "Table creation outcome", body = TableCreationOutcome),
        (status = 404, description = "Diagnostics disabled", body = Error)
    ),
    tags = ["diagnostics"],
    operation_id = "createTable",
    security([])
)]
#[post("/diagnostics/table")]
pub async fn create_table(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TableCreationOutcome>> {
    let diagnostics = panel(&state)?;
    let caller = caller_of(&state, &session).await?;
    Ok(web::Json(diagnostics.create_table(&caller).await))
}
