#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_state;
pub mod backend;
pub mod config;
pub mod error;
pub mod history_service;
pub mod notification;
pub mod platform;
pub mod session;

pub use assess_core::Clock;

pub use app_services::AppServices;
pub use app_state::AppState;
pub use backend::{AssessmentBackend, Document, HttpBackend, SubmitAck};
pub use config::{BackendConfig, SessionConfig};
pub use error::{AppServicesError, AppStateError, BackendError, HistoryError, SessionError};
pub use history_service::HistoryService;
pub use notification::{Notice, NoticeBoard, NoticeKind};
pub use platform::{Platform, StoragePlatform};
pub use session::{
    FinalizeReason, LoadSource, SessionCommand, SessionController, SessionRunner, SessionSnapshot,
    SessionState,
};
