use std::sync::{Arc, Mutex};

use services::{AppServices, AppState, HistoryService, LoadSource, SessionRunner, StoragePlatform};

pub trait UiApp: Send + Sync {
    fn services(&self) -> AppServices;

    /// A test to open straight away, from launch flags.
    fn launch_source(&self) -> Option<LoadSource>;
}

#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
    pending: Arc<Mutex<Option<LoadSource>>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            services: app.services(),
            pending: Arc::new(Mutex::new(app.launch_source())),
        }
    }

    #[must_use]
    pub fn app_state(&self) -> Arc<AppState> {
        self.services.app_state()
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        self.services.history()
    }

    #[must_use]
    pub fn platform(&self) -> Arc<StoragePlatform> {
        self.services.platform()
    }

    /// Queue the source the assessment page should load next.
    pub fn set_pending(&self, source: LoadSource) {
        match self.pending.lock() {
            Ok(mut pending) => *pending = Some(source),
            Err(poisoned) => *poisoned.into_inner() = Some(source),
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        match self.pending.lock() {
            Ok(pending) => pending.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Consume the queued source and spawn its session.
    #[must_use]
    pub fn start_pending(&self) -> Option<SessionRunner> {
        let source = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }?;
        Some(self.services.start_session(source))
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
