//! Driving port for the debug-only diagnostics panel.

use async_trait::async_trait;

use super::Caller;
use crate::domain::{ConnectivityReport, SchemaStatus, TableCreationOutcome, TestRecordOutcome};

/// Manual, idempotent probes of the backend's `vows` relation.
#[async_trait]
pub trait Diagnostics: Send + Sync {
    /// Bounded read classifying the backend as reachable, missing the
    /// relation, or failing otherwise.
    async fn connectivity(&self, caller: &Caller) -> ConnectivityReport;

    /// Read-based check of whether the relation exists.
    async fn schema_status(&self, caller: &Caller) -> SchemaStatus;

    /// Insert a placeholder row, then re-check once after the configured
    /// delay if the insert succeeded.
    async fn create_test_record(&self, caller: &Caller) -> TestRecordOutcome;

    /// Create the relation through the `exec_sql` procedure, falling back to
    /// a placeholder insert when the procedure is unavailable.
    async fn create_table(&self, caller: &Caller) -> TableCreationOutcome;
}
