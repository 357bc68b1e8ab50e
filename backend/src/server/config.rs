//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use vows_backend::domain::DEFAULT_RECHECK_DELAY;
use vows_backend::outbound::supabase::SupabaseClient;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend: Option<SupabaseClient>,
    pub(crate) diagnostics: bool,
    pub(crate) recheck_delay: Duration,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Starts against the in-memory fixtures with the diagnostics panel off.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            backend: None,
            diagnostics: false,
            recheck_delay: DEFAULT_RECHECK_DELAY,
        }
    }

    /// Attach the hosted backend client.
    ///
    /// When provided, every driven port is served by the backend instead of
    /// the fixtures.
    #[must_use]
    pub fn with_backend(mut self, client: SupabaseClient) -> Self {
        self.backend = Some(client);
        self
    }

    /// Serve the diagnostics panel, re-checking after `recheck_delay`.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool, recheck_delay: Duration) -> Self {
        self.diagnostics = enabled;
        self.recheck_delay = recheck_delay;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by bootstrap tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
