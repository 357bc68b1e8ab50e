//! HTTP inbound adapter exposing the JSON API.

pub mod auth;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod vows;

pub use error::ApiResult;
