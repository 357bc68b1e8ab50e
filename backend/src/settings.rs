//! Application settings loaded via OrthoConfig.
//!
//! Values come from `VOWS_*` environment variables, an optional config file
//! and the command line, in increasing order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::DEFAULT_RECHECK_DELAY;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Problems turning loaded settings into runtime values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// Only one half of the backend connection was supplied.
    #[error("VOWS_BACKEND_URL and VOWS_BACKEND_ANON_KEY must be set together")]
    IncompleteBackend,
    /// The backend URL did not parse.
    #[error("invalid backend URL {url:?}: {message}")]
    InvalidBackendUrl { url: String, message: String },
    /// The bind address did not parse.
    #[error("invalid bind address {addr:?}: {message}")]
    InvalidBindAddr { addr: String, message: String },
}

/// Hosted backend location and public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub url: Url,
    pub anon_key: String,
}

/// Configuration values controlling the vows service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VOWS")]
pub struct AppSettings {
    /// Base URL of the Supabase project.
    pub backend_url: Option<String>,
    /// Public anon key of the Supabase project.
    pub backend_anon_key: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Force the diagnostics panel on or off.
    ///
    /// Boolean fields stay off the command line: a clap `SetTrue` flag always
    /// yields a value and would mask the environment.
    #[ortho_config(skip_cli)]
    pub diagnostics: Option<bool>,
    /// Run the connectivity check once at startup and log the result.
    #[ortho_config(skip_cli, default = false)]
    pub startup_probe: bool,
    /// Delay before the post-insert schema re-check, in milliseconds.
    pub recheck_delay_ms: Option<u64>,
}

impl AppSettings {
    /// Backend connection, or `None` to run against the in-memory fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::IncompleteBackend`] when only one of the URL
    /// and key is set, and [`SettingsError::InvalidBackendUrl`] when the URL
    /// does not parse.
    pub fn backend(&self) -> Result<Option<BackendSettings>, SettingsError> {
        let url = self.backend_url.as_deref().filter(|v| !v.trim().is_empty());
        let key = self
            .backend_anon_key
            .as_deref()
            .filter(|v| !v.trim().is_empty());
        match (url, key) {
            (None, None) => Ok(None),
            (Some(url), Some(key)) => {
                let parsed = Url::parse(url.trim()).map_err(|err| {
                    SettingsError::InvalidBackendUrl {
                        url: url.to_owned(),
                        message: err.to_string(),
                    }
                })?;
                Ok(Some(BackendSettings {
                    url: parsed,
                    anon_key: key.trim().to_owned(),
                }))
            }
            _ => Err(SettingsError::IncompleteBackend),
        }
    }

    /// Configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidBindAddr {
                addr: raw.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Whether the diagnostics panel is served. Defaults to debug builds only.
    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics.unwrap_or(cfg!(debug_assertions))
    }

    /// Delay before the post-insert re-check.
    pub fn recheck_delay(&self) -> Duration {
        self.recheck_delay_ms
            .map_or(DEFAULT_RECHECK_DELAY, Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "VOWS_BACKEND_URL",
        "VOWS_BACKEND_ANON_KEY",
        "VOWS_BIND_ADDR",
        "VOWS_DIAGNOSTICS",
        "VOWS_STARTUP_PROBE",
        "VOWS_RECHECK_DELAY_MS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("vows-backend")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let settings = load_with(&[]);
        assert_eq!(settings.backend(), Ok(None));
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 8080)))
        );
        assert_eq!(settings.diagnostics_enabled(), cfg!(debug_assertions));
        assert!(!settings.startup_probe);
        assert_eq!(settings.recheck_delay(), DEFAULT_RECHECK_DELAY);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("VOWS_BACKEND_URL", "https://project.supabase.co"),
            ("VOWS_BACKEND_ANON_KEY", "anon-key"),
            ("VOWS_BIND_ADDR", "127.0.0.1:9090"),
            ("VOWS_DIAGNOSTICS", "false"),
            ("VOWS_STARTUP_PROBE", "true"),
            ("VOWS_RECHECK_DELAY_MS", "250"),
        ]);
        let backend = settings.backend().expect("valid").expect("configured");
        assert_eq!(backend.url.as_str(), "https://project.supabase.co/");
        assert_eq!(backend.anon_key, "anon-key");
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 9090)))
        );
        assert!(!settings.diagnostics_enabled());
        assert!(settings.startup_probe);
        assert_eq!(settings.recheck_delay(), Duration::from_millis(250));
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn diagnostics_flag_follows_the_environment(#[case] raw: &str, #[case] expected: bool) {
        let settings = load_with(&[("VOWS_DIAGNOSTICS", raw)]);
        assert_eq!(settings.diagnostics, Some(expected));
        assert_eq!(settings.diagnostics_enabled(), expected);
    }

    #[rstest]
    #[case(&[("VOWS_BACKEND_URL", "https://project.supabase.co")])]
    #[case(&[("VOWS_BACKEND_ANON_KEY", "anon-key")])]
    fn half_a_backend_is_rejected(#[case] overrides: &[(&str, &str)]) {
        let settings = load_with(overrides);
        assert_eq!(settings.backend(), Err(SettingsError::IncompleteBackend));
    }

    #[rstest]
    fn malformed_values_are_reported() {
        let settings = load_with(&[
            ("VOWS_BACKEND_URL", "not a url"),
            ("VOWS_BACKEND_ANON_KEY", "anon-key"),
            ("VOWS_BIND_ADDR", "localhost"),
        ]);
        assert!(matches!(
            settings.backend(),
            Err(SettingsError::InvalidBackendUrl { .. })
        ));
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::InvalidBindAddr { .. })
        ));
    }
}
