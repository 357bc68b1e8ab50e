//! Driven port for the backend's privileged `exec_sql` remote procedure.
//!
//! Only the diagnostics table creator uses it. Most deployments do not
//! define the procedure, and callers must expect a "function not found"
//! rejection.

use async_trait::async_trait;

use super::{BackendError, Caller};

/// Name of the remote procedure executing arbitrary SQL.
pub const EXEC_SQL_FUNCTION: &str = "exec_sql";

/// Port for running a SQL script through the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlRpc: Send + Sync {
    /// Execute `sql` as one script.
    async fn exec_sql(&self, caller: &Caller, sql: &str) -> Result<(), BackendError>;
}

/// Stand-in used when no backend is configured: behaves like a deployment
/// without the procedure.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSqlRpc;

#[async_trait]
impl SqlRpc for FixtureSqlRpc {
    async fn exec_sql(&self, _caller: &Caller, _sql: &str) -> Result<(), BackendError> {
        Err(BackendError::rejected(
            404_u16,
            "PGRST202",
            format!(
                "Could not find the function public.{EXEC_SQL_FUNCTION}(sql_query) in the schema cache"
            ),
        ))
    }
}
