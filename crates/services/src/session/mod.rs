//! Timed assessment session: navigation, answers, controller and its task runner.

mod answers;
mod controller;
mod editor;
mod navigator;
mod runner;
mod submission;

pub use answers::AnswerStore;
pub use controller::{
    ActiveQuestion, FinalizeReason, LoadSource, QuestionSummary, RequestTicket, SessionController,
    SessionSnapshot, SessionState, SubmitRequest, fetch_questions,
};
pub use editor::CodeEditor;
pub use navigator::QuestionNavigator;
pub use runner::{SessionCommand, SessionRunner};
pub use submission::build_submission;
