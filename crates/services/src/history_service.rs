use std::sync::Arc;

use assess_core::model::{TestId, TestSummary, UserId};

use crate::app_state::AppState;
use crate::backend::AssessmentBackend;
use crate::error::HistoryError;

/// Past attempts and bookmarks for the signed-in user.
#[derive(Clone)]
pub struct HistoryService {
    app_state: Arc<AppState>,
    backend: Arc<dyn AssessmentBackend>,
}

impl HistoryService {
    #[must_use]
    pub fn new(app_state: Arc<AppState>, backend: Arc<dyn AssessmentBackend>) -> Self {
        Self { app_state, backend }
    }

    fn user_id(&self) -> Result<UserId, HistoryError> {
        self.app_state.user_id().ok_or(HistoryError::NotSignedIn)
    }

    /// # Errors
    ///
    /// Returns `HistoryError::NotSignedIn` without a user, or backend failures.
    pub async fn list_history(&self) -> Result<Vec<TestSummary>, HistoryError> {
        let user_id = self.user_id()?;
        let tests = self.backend.history(&user_id).await?;
        tracing::debug!(count = tests.len(), "loaded test history");
        Ok(tests)
    }

    /// # Errors
    ///
    /// Returns `HistoryError::NotSignedIn` without a user, or backend failures.
    pub async fn list_bookmarked(&self) -> Result<Vec<TestSummary>, HistoryError> {
        let user_id = self.user_id()?;
        Ok(self.backend.bookmarked(&user_id).await?)
    }

    /// Flip the bookmark flag on `summary` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Backend` if the update is rejected.
    pub async fn toggle_bookmark(&self, summary: &TestSummary) -> Result<bool, HistoryError> {
        let bookmarked = !summary.bookmarked;
        self.set_bookmark(&summary.id, bookmarked).await?;
        Ok(bookmarked)
    }

    /// # Errors
    ///
    /// Returns `HistoryError::Backend` if the update is rejected.
    pub async fn set_bookmark(&self, test_id: &TestId, bookmarked: bool) -> Result<(), HistoryError> {
        self.backend.set_bookmark(test_id, bookmarked).await?;
        tracing::info!(test_id = test_id.as_str(), bookmarked, "bookmark updated");
        Ok(())
    }
}
