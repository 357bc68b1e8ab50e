//! Backend entry-point: loads settings, wires adapters and starts the server.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, build_diagnostics, create_server};
use vows_backend::domain::ports::{Caller, Diagnostics};
use vows_backend::inbound::http::health::HealthState;
use vows_backend::inbound::http::session_config::fingerprint::key_fingerprint;
use vows_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use vows_backend::outbound::supabase::SupabaseClient;
use vows_backend::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_diagnostics(settings.diagnostics_enabled(), settings.recheck_delay());

    match settings.backend()? {
        Some(backend) => {
            info!(url = %backend.url, "using hosted backend");
            let client = SupabaseClient::new(backend.url, backend.anon_key)
                .wrap_err("failed to build backend client")?;
            config = config.with_backend(client);
        }
        None => warn!("no backend configured; serving in-memory fixtures"),
    }

    if settings.startup_probe {
        let report = build_diagnostics(&config)
            .connectivity(&Caller::Anonymous)
            .await;
        info!(
            status = ?report.status,
            summary = %report.summary,
            error = ?report.error,
            "startup connectivity probe"
        );
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
