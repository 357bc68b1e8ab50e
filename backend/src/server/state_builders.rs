//! Builders for HTTP state from driven-port adapters.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;

use vows_backend::domain::ports::{
    AuthProvider, FixtureAuthProvider, FixtureSqlRpc, FixtureVowRepository, SqlRpc, VowRepository,
};
use vows_backend::domain::{AuthGateService, DiagnosticsService, VowSubmissionService};
use vows_backend::inbound::http::state::HttpState;
use vows_backend::outbound::supabase::SupabaseClient;

use super::ServerConfig;

/// The three driven ports every service is assembled from.
#[derive(Clone)]
pub(crate) struct DrivenPorts {
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) vows: Arc<dyn VowRepository>,
    pub(crate) rpc: Arc<dyn SqlRpc>,
}

impl DrivenPorts {
    /// One backend client behind all three ports.
    pub(crate) fn backend(client: SupabaseClient) -> Self {
        let client = Arc::new(client);
        Self {
            auth: client.clone(),
            vows: client.clone(),
            rpc: client,
        }
    }

    /// In-memory fixtures for running without a backend.
    pub(crate) fn fixtures() -> Self {
        Self {
            auth: Arc::new(FixtureAuthProvider),
            vows: Arc::new(FixtureVowRepository::new()),
            rpc: Arc::new(FixtureSqlRpc),
        }
    }

    pub(crate) fn from_option(backend: Option<SupabaseClient>) -> Self {
        backend.map_or_else(Self::fixtures, Self::backend)
    }
}

/// Assemble the driving services over `ports`.
pub(crate) fn build_state_from_ports(
    ports: DrivenPorts,
    diagnostics: Option<Duration>,
) -> HttpState {
    let DrivenPorts { auth, vows, rpc } = ports;
    let state = HttpState::new(
        Arc::new(AuthGateService::new(auth)),
        Arc::new(VowSubmissionService::new(vows.clone())),
    );
    match diagnostics {
        Some(delay) => state.with_diagnostics(Arc::new(
            DiagnosticsService::new(vows, rpc).with_recheck_delay(delay),
        )),
        None => state,
    }
}

/// Build the diagnostics service for the startup probe.
pub(crate) fn build_diagnostics(config: &ServerConfig) -> DiagnosticsService {
    let DrivenPorts { vows, rpc, .. } = DrivenPorts::from_option(config.backend.clone());
    DiagnosticsService::new(vows, rpc).with_recheck_delay(config.recheck_delay)
}

/// Build HTTP state, backed by the hosted backend when one is configured.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = DrivenPorts::from_option(config.backend.clone());
    let diagnostics = config.diagnostics.then_some(config.recheck_delay);
    web::Data::new(build_state_from_ports(ports, diagnostics))
}
