//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`AuthGate`], [`VowSubmission`], [`Diagnostics`]) are what
//! inbound adapters call. Driven ports ([`AuthProvider`], [`VowRepository`],
//! [`SqlRpc`]) are what the hosted backend adapters implement; each ships a
//! fixture used when no backend is configured.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gate;
mod auth_provider;
mod backend_error;
mod diagnostics;
mod sql_rpc;
mod vow_repository;
mod vow_submission;

pub use auth_gate::AuthGate;
#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{
    AuthProvider, FIXTURE_EMAIL, FIXTURE_PASSWORD, FIXTURE_REFRESH_TOKEN, FIXTURE_USER_ID,
    FixtureAuthProvider,
};
pub use backend_error::{BackendError, Caller, NO_ROWS_CODE};
pub use diagnostics::Diagnostics;
#[cfg(test)]
pub use sql_rpc::MockSqlRpc;
pub use sql_rpc::{EXEC_SQL_FUNCTION, FixtureSqlRpc, SqlRpc};
#[cfg(test)]
pub use vow_repository::MockVowRepository;
pub use vow_repository::{FIXTURE_ROW_LIMIT, FixtureVowRepository, VowRepository};
pub use vow_submission::VowSubmission;
