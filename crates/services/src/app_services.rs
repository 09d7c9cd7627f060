use std::sync::Arc;

use assess_core::Clock;
use storage::Storage;

use crate::app_state::AppState;
use crate::backend::{AssessmentBackend, HttpBackend};
use crate::config::{BackendConfig, SessionConfig};
use crate::error::AppServicesError;
use crate::history_service::HistoryService;
use crate::platform::{Platform, StoragePlatform};
use crate::session::{LoadSource, SessionController, SessionRunner};

/// Assembles app-facing services around one platform and backend.
#[derive(Clone)]
pub struct AppServices {
    platform: Arc<StoragePlatform>,
    app_state: Arc<AppState>,
    backend: Arc<dyn AssessmentBackend>,
    history: Arc<HistoryService>,
    session_config: SessionConfig,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage, stored state or the HTTP client fail to initialize.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        backend_config: BackendConfig,
        session_config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let backend = Arc::new(HttpBackend::new(backend_config)?);
        Self::from_parts(storage, clock, backend, session_config).await
    }

    /// Build services from already-constructed parts.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::AppState` if stored state cannot be read.
    pub async fn from_parts(
        storage: Storage,
        clock: Clock,
        backend: Arc<dyn AssessmentBackend>,
        session_config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let platform = Arc::new(StoragePlatform::new(Arc::clone(&storage.kv), clock));
        let app_state = Arc::new(AppState::load(platform.clone()).await?);
        let history = Arc::new(HistoryService::new(
            Arc::clone(&app_state),
            Arc::clone(&backend),
        ));
        Ok(Self {
            platform,
            app_state,
            backend,
            history,
            session_config,
        })
    }

    /// A fresh controller for one attempt.
    #[must_use]
    pub fn new_session(&self) -> SessionController {
        SessionController::new(
            self.platform.clone(),
            Arc::clone(&self.app_state),
            Arc::clone(&self.backend),
            self.session_config,
        )
    }

    /// Spawn a session task that loads `source` and watches page visibility.
    #[must_use]
    pub fn start_session(&self, source: LoadSource) -> SessionRunner {
        let visibility = self.platform.on_visibility_change();
        SessionRunner::spawn(self.new_session(), source, visibility)
    }

    #[must_use]
    pub fn platform(&self) -> Arc<StoragePlatform> {
        Arc::clone(&self.platform)
    }

    #[must_use]
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::clone(&self.app_state)
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn AssessmentBackend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        self.session_config
    }
}
