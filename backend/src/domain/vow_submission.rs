//! Vow form submission use-case.
//!
//! The backend is the only validator. A successful insert clears the form; a
//! failed one hands the submitted values back untouched with the backend's
//! message in the status line.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::ports::{Caller, VowRepository, VowSubmission};
use super::{BackendSession, VowForm};

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// The backend accepted the row.
    Submitted,
    /// The backend rejected the row or could not be reached.
    Failed {
        /// Backend message, verbatim.
        message: String,
    },
}

impl SubmissionStatus {
    /// Single status line shown above the form.
    ///
    /// # Examples
    /// ```
    /// use vows_backend::domain::SubmissionStatus;
    ///
    /// let failed = SubmissionStatus::Failed { message: "permission denied".into() };
    /// assert_eq!(failed.line(), "❌ Error: permission denied");
    /// ```
    pub fn line(&self) -> String {
        match self {
            Self::Submitted => "✅ Vow submitted successfully!".to_owned(),
            Self::Failed { message } => format!("❌ Error: {message}"),
        }
    }

    /// Whether the vow was stored.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// Form state after a submission: the status line plus the values to
/// re-display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VowSubmissionOutcome {
    /// Whether the vow was stored.
    pub success: bool,
    /// Status line shown above the form.
    #[schema(example = "✅ Vow submitted successfully!")]
    pub message: String,
    /// Cleared on success, the submitted values on failure.
    pub form: VowForm,
}

impl VowSubmissionOutcome {
    fn new(status: &SubmissionStatus, form: VowForm) -> Self {
        Self {
            success: status.is_success(),
            message: status.line(),
            form,
        }
    }
}

/// [`VowSubmission`] implementation backed by a [`VowRepository`].
#[derive(Clone)]
pub struct VowSubmissionService {
    vows: Arc<dyn VowRepository>,
}

impl VowSubmissionService {
    /// Build the service around the vows relation.
    pub fn new(vows: Arc<dyn VowRepository>) -> Self {
        Self { vows }
    }
}

#[async_trait]
impl VowSubmission for VowSubmissionService {
    async fn submit(&self, session: Option<&BackendSession>, form: VowForm) -> VowSubmissionOutcome {
        let owner = session.map(|s| s.user_id.clone());
        let caller = Caller::from_session(session);
        let vow = form.to_new_vow(owner);

        match self.vows.insert(&caller, &vow).await {
            Ok(()) => {
                info!(
                    owner = ?vow.user_id.as_ref().map(ToString::to_string),
                    "vow submitted"
                );
                VowSubmissionOutcome::new(&SubmissionStatus::Submitted, VowForm::default())
            }
            Err(err) => {
                warn!(error = %err, "vow insert rejected");
                let status = SubmissionStatus::Failed {
                    message: err.message().to_owned(),
                };
                VowSubmissionOutcome::new(&status, form)
            }
        }
    }
}
