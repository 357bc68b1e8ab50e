//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::domain::ports::{
    AuthGate, Diagnostics, FixtureAuthProvider, FixtureSqlRpc, FixtureVowRepository,
    VowSubmission,
};
use crate::domain::{AuthGateService, DiagnosticsService, VowSubmissionService};

use super::state::HttpState;

/// Session middleware for tests: fresh key per call, `session` cookie name,
/// `Secure` disabled for plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Fixture-backed HTTP state with diagnostics enabled.
pub fn fixture_state() -> HttpState {
    let vows = Arc::new(FixtureVowRepository::new());
    let auth_gate: Arc<dyn AuthGate> =
        Arc::new(AuthGateService::new(Arc::new(FixtureAuthProvider)));
    let submission: Arc<dyn VowSubmission> = Arc::new(VowSubmissionService::new(vows.clone()));
    let diagnostics: Arc<dyn Diagnostics> =
        Arc::new(DiagnosticsService::new(vows, Arc::new(FixtureSqlRpc)));
    HttpState::new(auth_gate, submission).with_diagnostics(diagnostics)
}
