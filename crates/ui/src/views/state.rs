use dioxus::prelude::*;

use services::HistoryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotSignedIn,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NotSignedIn => "Sign in to see your tests.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<HistoryError> for ViewError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NotSignedIn => ViewError::NotSignedIn,
            other => {
                tracing::warn!(error = %other, "history request failed");
                ViewError::Unknown
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
