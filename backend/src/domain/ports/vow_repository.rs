//! Driven port for the backend's `vows` relation.
//!
//! Only bounded reads and inserts exist; vows are never updated or deleted.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BackendError, Caller};
use crate::domain::{NewVow, RowKey, Vow};

/// Rows kept by [`FixtureVowRepository`] before the oldest are dropped.
pub const FIXTURE_ROW_LIMIT: usize = 1_000;

/// Port for reading and inserting vow rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VowRepository: Send + Sync {
    /// Read at most `limit` rows.
    async fn select(&self, caller: &Caller, limit: usize) -> Result<Vec<Vow>, BackendError>;

    /// Insert one row; the backend assigns `id` and `created_at`.
    async fn insert(&self, caller: &Caller, vow: &NewVow) -> Result<(), BackendError>;
}

/// In-memory relation used when no backend is configured.
///
/// Meant for local development only. It keeps the newest
/// [`FIXTURE_ROW_LIMIT`] rows so a long-running dev server cannot grow
/// without bound. [`FixtureVowRepository::missing`] simulates an
/// unprovisioned table so the diagnostics flows can be exercised locally.
#[derive(Debug)]
pub struct FixtureVowRepository {
    rows: Mutex<VecDeque<Vow>>,
    row_limit: usize,
    missing: bool,
}

impl Default for FixtureVowRepository {
    fn default() -> Self {
        Self {
            rows: Mutex::default(),
            row_limit: FIXTURE_ROW_LIMIT,
            missing: false,
        }
    }
}

impl FixtureVowRepository {
    /// An empty, provisioned relation.
    pub fn new() -> Self {
        Self::default()
    }

    /// A relation that reports itself as missing on every call.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Keep at most `limit` rows, dropping the oldest first.
    #[must_use]
    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }

    fn missing_error() -> BackendError {
        BackendError::rejected(
            404_u16,
            "42P01",
            r#"relation "public.vows" does not exist"#,
        )
    }
}

#[async_trait]
impl VowRepository for FixtureVowRepository {
    async fn select(&self, _caller: &Caller, limit: usize) -> Result<Vec<Vow>, BackendError> {
        if self.missing {
            return Err(Self::missing_error());
        }
        let rows = self.rows.lock().await;
        Ok(rows.iter().take(limit).cloned().collect())
    }

    async fn insert(&self, _caller: &Caller, vow: &NewVow) -> Result<(), BackendError> {
        if self.missing {
            return Err(Self::missing_error());
        }
        let row = Vow {
            id: Some(RowKey::Uuid(Uuid::new_v4())),
            user_id: vow.user_id.as_ref().map(|id| RowKey::Uuid(*id.as_uuid())),
            first_name: Some(vow.first_name.clone()),
            surname: Some(vow.surname.clone()),
            phone: Some(vow.phone.clone()),
            email: Some(vow.email.clone()),
            amount: vow.amount.is_finite().then_some(vow.amount),
            chapter: Some(vow.chapter.clone()),
            country: Some(vow.country.clone()),
            state: Some(vow.state.clone()),
            purpose: Some(vow.purpose.clone()),
            created_at: Some(Utc::now()),
        };
        if self.row_limit == 0 {
            return Ok(());
        }
        let mut rows = self.rows.lock().await;
        while rows.len() >= self.row_limit {
            rows.pop_front();
        }
        rows.push_back(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VowForm;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn inserted_rows_are_readable_up_to_the_limit() {
        let repo = FixtureVowRepository::new();
        let vow = VowForm::default().to_new_vow(None);
        for _ in 0..3 {
            repo.insert(&Caller::Anonymous, &vow).await.expect("insert");
        }

        let rows = repo.select(&Caller::Anonymous, 2).await.expect("select");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.id.is_some()));
    }

    #[rstest]
    #[tokio::test]
    async fn oldest_rows_are_dropped_past_the_limit() {
        let repo = FixtureVowRepository::new().with_row_limit(2);
        for name in ["first", "second", "third"] {
            let form = VowForm {
                first_name: name.to_owned(),
                ..VowForm::default()
            };
            repo.insert(&Caller::Anonymous, &form.to_new_vow(None))
                .await
                .expect("insert");
        }

        let rows = repo.select(&Caller::Anonymous, 10).await.expect("select");
        let names: Vec<_> = rows.iter().filter_map(|row| row.first_name.as_deref()).collect();
        assert_eq!(names, ["second", "third"]);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_relation_reports_does_not_exist() {
        let repo = FixtureVowRepository::missing();
        let err = repo
            .select(&Caller::Anonymous, 1)
            .await
            .expect_err("missing table");
        assert!(err.reports_missing_object());
    }
}
