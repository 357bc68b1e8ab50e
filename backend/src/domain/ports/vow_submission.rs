//! Driving port for submitting the vow form.

use async_trait::async_trait;

use crate::domain::{BackendSession, VowForm, VowSubmissionOutcome};

/// Domain use-case port for vow submission.
#[async_trait]
pub trait VowSubmission: Send + Sync {
    /// Insert the form as a new vow owned by `session`'s user, if any.
    ///
    /// Never fails: backend errors become the outcome's status line.
    async fn submit(&self, session: Option<&BackendSession>, form: VowForm) -> VowSubmissionOutcome;
}
