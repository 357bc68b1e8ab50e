//! Shared HTTP adapter state.
//!
//! Handlers accept this through `web::Data` so they depend only on driving
//! ports and stay testable without network I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthGate, Diagnostics, VowSubmission};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth_gate: Arc<dyn AuthGate>,
    pub vows: Arc<dyn VowSubmission>,
    /// Absent when the diagnostics panel is disabled.
    pub diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl HttpState {
    /// Construct state with the diagnostics panel disabled.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use vows_backend::domain::ports::{FixtureAuthProvider, FixtureVowRepository};
    /// use vows_backend::domain::{AuthGateService, VowSubmissionService};
    /// use vows_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(AuthGateService::new(Arc::new(FixtureAuthProvider))),
    ///     Arc::new(VowSubmissionService::new(Arc::new(FixtureVowRepository::new()))),
    /// );
    /// assert!(state.diagnostics.is_none());
    /// ```
    pub fn new(auth_gate: Arc<dyn AuthGate>, vows: Arc<dyn VowSubmission>) -> Self {
        Self {
            auth_gate,
            vows,
            diagnostics: None,
        }
    }

    /// Enable the diagnostics panel.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }
}
