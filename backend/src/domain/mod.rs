//! Domain primitives, use-case services and ports.
//!
//! Purpose: Define the vow form's entities and the three user-facing
//! features (auth gate, vow form, diagnostics) independently of HTTP and of
//! the hosted backend. Inbound adapters call the driving ports; outbound
//! adapters implement the driven ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - VowForm / NewVow / Vow — the form, the insert payload and a stored row.
//! - BackendSession / SessionResumption — stored auth session and its expiry check.
//! - AuthGateService, VowSubmissionService, DiagnosticsService — use-cases.

pub mod auth;
pub mod auth_gate;
pub mod diagnostics;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod vow;
pub mod vow_submission;

pub use self::auth::{
    AccessToken, AuthCredentials, AuthMode, AuthOutcome, AuthValidationError, BackendSession,
    RefreshToken, SESSION_EXPIRY_MARGIN, SessionResumption,
};
pub use self::auth_gate::AuthGateService;
pub use self::diagnostics::{
    AuthStatus, CREATE_VOWS_TABLE_SQL, ConnectivityReport, ConnectivityStatus,
    DEFAULT_RECHECK_DELAY, DiagnosticsService, SchemaStatus, TableCreationOutcome, TableState,
    TestRecordOutcome,
};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserIdValidationError};
pub use self::vow::{NewVow, RowKey, VOWS_TABLE, Vow, VowForm, parse_amount};
pub use self::vow_submission::{SubmissionStatus, VowSubmissionOutcome, VowSubmissionService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use vows_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
