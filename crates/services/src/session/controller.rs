use std::fmt;
use std::sync::Arc;

use assess_core::model::{
    Answer, Question, QuestionId, QuestionKind, SubmissionRecord, TestId, validate_question_set,
};
use assess_core::{Countdown, IntegrityEvent, IntegrityMonitor, TickOutcome};

use crate::app_state::AppState;
use crate::backend::{AssessmentBackend, Document, SubmitAck};
use crate::config::SessionConfig;
use crate::error::{BackendError, SessionError};
use crate::notification::{Notice, NoticeBoard};
use crate::platform::Platform;

use super::answers::AnswerStore;
use super::navigator::QuestionNavigator;
use super::submission::build_submission;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Running,
    AwaitingConfirmation,
    /// Timers are frozen and the record is being (or failed to be) delivered.
    Finalizing,
    Submitted,
    LoadFailed,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Submitted | SessionState::LoadFailed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeReason {
    Confirmed,
    TimedOut,
    IntegrityViolation,
}

/// Where a session gets its questions from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Retake(TestId),
    Upload(Document),
}

/// Issued with every backend request; a reply carrying an outdated ticket is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

/// A submission ready to be posted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub ticket: RequestTicket,
    pub record: SubmissionRecord,
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSummary {
    pub id: QuestionId,
    /// One-based position in the list.
    pub number: usize,
    pub kind: QuestionKind,
    pub answered: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuestion {
    pub question: Question,
    pub answer: Option<Answer>,
    pub editor_text: Option<String>,
    pub editor_language: Option<String>,
    pub is_last: bool,
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub timer_label: String,
    pub remaining_secs: u32,
    pub violations: u32,
    pub max_violations: u32,
    pub questions: Vec<QuestionSummary>,
    pub active: Option<ActiveQuestion>,
    pub mcq_answered: usize,
    pub coding_answered: usize,
    pub notices: Vec<Notice>,
    pub finalize_reason: Option<FinalizeReason>,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives one timed attempt from question load to submission.
///
/// Synchronous transitions happen here; backend calls are split into a
/// `begin_*` half that issues a `RequestTicket` and an `apply_*` half that
/// applies the reply if the ticket is still current.
pub struct SessionController {
    platform: Arc<dyn Platform>,
    app_state: Arc<AppState>,
    backend: Arc<dyn AssessmentBackend>,
    config: SessionConfig,
    state: SessionState,
    navigator: QuestionNavigator,
    answers: AnswerStore,
    countdown: Countdown,
    monitor: IntegrityMonitor,
    notices: NoticeBoard,
    generation: u64,
    torn_down: bool,
    finalize_reason: Option<FinalizeReason>,
    record: Option<SubmissionRecord>,
    submit_in_flight: bool,
    ack: Option<SubmitAck>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        platform: Arc<dyn Platform>,
        app_state: Arc<AppState>,
        backend: Arc<dyn AssessmentBackend>,
        config: SessionConfig,
    ) -> Self {
        Self {
            platform,
            app_state,
            backend,
            config,
            state: SessionState::Loading,
            navigator: QuestionNavigator::new(Vec::new()),
            answers: AnswerStore::new(),
            countdown: Countdown::new(),
            monitor: IntegrityMonitor::new(config.max_tab_switches),
            notices: NoticeBoard::new(config.notice_ttl_secs),
            generation: 0,
            torn_down: false,
            finalize_reason: None,
            record: None,
            submit_in_flight: false,
            ack: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn AssessmentBackend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn navigator(&self) -> &QuestionNavigator {
        &self.navigator
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn monitor(&self) -> &IntegrityMonitor {
        &self.monitor
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        self.notices.active()
    }

    #[must_use]
    pub fn finalize_reason(&self) -> Option<FinalizeReason> {
        self.finalize_reason
    }

    /// The record built at finalization, if any.
    #[must_use]
    pub fn record(&self) -> Option<&SubmissionRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub fn ack(&self) -> Option<&SubmitAck> {
        self.ack.as_ref()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn ticket(&self) -> RequestTicket {
        RequestTicket {
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        !self.torn_down && ticket.generation == self.generation
    }

    fn require(&self, allowed: &[SessionState]) -> Result<(), SessionError> {
        if self.torn_down || !allowed.contains(&self.state) {
            return Err(SessionError::InvalidState(self.state));
        }
        Ok(())
    }

    // ── loading ──────────────────────────────────────────────────────────────

    /// Start the question request. Returns `None` unless the session is loading.
    pub fn begin_load(&mut self) -> Option<RequestTicket> {
        if self.torn_down || self.state != SessionState::Loading {
            return None;
        }
        Some(self.ticket())
    }

    /// Apply the question reply for `ticket`.
    ///
    /// Returns `Ok(false)` when the reply is stale and was discarded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LoadFailed` or `SessionError::QuestionSet` after
    /// moving to `LoadFailed`.
    pub fn apply_loaded(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Question>, BackendError>,
    ) -> Result<bool, SessionError> {
        if !self.is_current(ticket) || self.state != SessionState::Loading {
            tracing::debug!(state = ?self.state, "discarding stale question reply");
            return Ok(false);
        }
        let now = self.platform.now();
        let questions = match result {
            Ok(questions) => questions,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load questions");
                self.state = SessionState::LoadFailed;
                self.notices.error("Failed to load questions", now);
                return Err(SessionError::LoadFailed(err));
            }
        };
        if let Err(err) = validate_question_set(&questions) {
            tracing::warn!(error = %err, "unusable question set");
            self.state = SessionState::LoadFailed;
            self.notices.error("No questions generated", now);
            return Err(err.into());
        }

        let first = questions[0].id();
        tracing::info!(questions = questions.len(), "assessment started");
        self.navigator = QuestionNavigator::new(questions);
        self.navigator.select(first, now, &mut self.answers);
        self.countdown.start(self.config.duration_secs);
        self.monitor.arm();
        self.state = SessionState::Running;
        Ok(true)
    }

    /// Fetch or generate questions and start the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if not loading, or the load failure.
    pub async fn load(&mut self, source: &LoadSource) -> Result<(), SessionError> {
        let ticket = self
            .begin_load()
            .ok_or(SessionError::InvalidState(self.state))?;
        let result = fetch_questions(self.backend.as_ref(), source).await;
        self.apply_loaded(ticket, result)?;
        Ok(())
    }

    // ── running ──────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn select(&mut self, id: QuestionId) -> Result<(), SessionError> {
        self.require(&[SessionState::Running])?;
        let now = self.platform.now();
        self.navigator.select(id, now, &mut self.answers);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::Running])?;
        let now = self.platform.now();
        self.navigator.next(now, &mut self.answers);
        Ok(())
    }

    /// Pick an option on the active multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running, or
    /// `SessionError::InvalidOption` for an index past the option list.
    pub fn choose_option(&mut self, index: usize) -> Result<(), SessionError> {
        self.require(&[SessionState::Running])?;
        let Some(mcq) = self.navigator.active().and_then(Question::as_multiple_choice) else {
            return Ok(());
        };
        if index >= mcq.options.len() {
            return Err(SessionError::InvalidOption { index });
        }
        let id = mcq.id;
        self.answers.set(id, Answer::Option(index));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn edit_code(&mut self, text: String) -> Result<(), SessionError> {
        self.require(&[SessionState::Running])?;
        self.navigator.edit_code(text, &mut self.answers);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running.
    pub fn set_language(&mut self, language: &str) -> Result<(), SessionError> {
        self.require(&[SessionState::Running])?;
        self.navigator.set_language(language);
        Ok(())
    }

    /// Open the confirmation step; the countdown pauses while it is open.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless running or already confirming.
    pub fn request_submit(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::Running, SessionState::AwaitingConfirmation])?;
        if self.state == SessionState::Running {
            self.countdown.pause();
            self.state = SessionState::AwaitingConfirmation;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless confirming.
    pub fn cancel_submit(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::AwaitingConfirmation])?;
        self.countdown.resume();
        self.state = SessionState::Running;
        Ok(())
    }

    /// Confirm the pending submission. `None` if there is nothing to confirm.
    pub fn confirm_submit(&mut self) -> Option<SubmitRequest> {
        if self.state != SessionState::AwaitingConfirmation {
            return None;
        }
        self.begin_finalize(FinalizeReason::Confirmed)
    }

    /// Advance the countdown by one second; expiry finalizes immediately.
    pub fn tick(&mut self) -> Option<SubmitRequest> {
        let now = self.platform.now();
        self.notices.prune(now);
        if self.torn_down {
            return None;
        }
        match self.countdown.tick() {
            TickOutcome::Expired => {
                tracing::info!("assessment time is up");
                self.begin_finalize(FinalizeReason::TimedOut)
            }
            TickOutcome::Ticked { .. } | TickOutcome::Inactive => None,
        }
    }

    /// Feed a page visibility change into the integrity monitor.
    pub fn visibility_changed(&mut self, hidden: bool) -> Option<SubmitRequest> {
        if self.torn_down
            || !matches!(
                self.state,
                SessionState::Running | SessionState::AwaitingConfirmation
            )
        {
            return None;
        }
        let now = self.platform.now();
        match self.monitor.observe(hidden)? {
            IntegrityEvent::Warning { remaining } => {
                tracing::info!(remaining, "tab switch detected");
                self.notices
                    .error(format!("Don't change tab! Remaining: {remaining}"), now);
                None
            }
            IntegrityEvent::LimitExceeded => {
                tracing::warn!(violations = self.monitor.violations(), "tab switch limit exceeded");
                self.notices
                    .error("Tab switch limit exceeded. Submitting your test.", now);
                self.begin_finalize(FinalizeReason::IntegrityViolation)
            }
        }
    }

    // ── finalization ─────────────────────────────────────────────────────────

    /// Freeze the session and build the submission.
    ///
    /// Returns `None` once finalization has already begun, so repeated
    /// requests never produce a second send.
    pub fn begin_finalize(&mut self, reason: FinalizeReason) -> Option<SubmitRequest> {
        if self.torn_down
            || !matches!(
                self.state,
                SessionState::Running | SessionState::AwaitingConfirmation
            )
        {
            return None;
        }
        let now = self.platform.now();
        self.state = SessionState::Finalizing;
        self.finalize_reason = Some(reason);
        self.navigator.freeze(now);
        self.navigator.capture_editor(&mut self.answers);
        self.countdown.cancel();
        self.monitor.detach();
        tracing::info!(?reason, "finalizing assessment");
        self.issue_submit()
    }

    /// Resend after a failed submission. Only a fresh user action calls this.
    pub fn retry_submit(&mut self) -> Option<SubmitRequest> {
        if self.torn_down || self.state != SessionState::Finalizing {
            return None;
        }
        self.issue_submit()
    }

    fn issue_submit(&mut self) -> Option<SubmitRequest> {
        if self.submit_in_flight {
            return None;
        }
        let now = self.platform.now();
        if self.record.is_none() {
            let Some(user_id) = self.app_state.user_id() else {
                tracing::warn!("cannot submit without a signed-in user");
                self.notices.error("Sign in before submitting your test", now);
                return None;
            };
            self.record = Some(build_submission(
                user_id,
                now,
                &self.navigator,
                &self.answers,
            ));
        }
        let record = self.record.clone()?;
        self.submit_in_flight = true;
        Some(SubmitRequest {
            ticket: self.ticket(),
            record,
        })
    }

    /// Apply the submit reply for `ticket`.
    ///
    /// Returns `Ok(false)` when the reply is stale and was discarded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SubmitFailed`; the session stays in `Finalizing`.
    pub fn apply_submitted(
        &mut self,
        ticket: RequestTicket,
        result: Result<SubmitAck, BackendError>,
    ) -> Result<bool, SessionError> {
        if !self.is_current(ticket) || self.state != SessionState::Finalizing {
            tracing::debug!(state = ?self.state, "discarding stale submit reply");
            return Ok(false);
        }
        self.submit_in_flight = false;
        let now = self.platform.now();
        match result {
            Ok(ack) => {
                tracing::info!(id = ?ack.id, "assessment submitted");
                self.notices.success("Test submitted", now);
                self.ack = Some(ack);
                self.state = SessionState::Submitted;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to submit test");
                self.notices.error("Failed to submit test", now);
                Err(SessionError::SubmitFailed(err))
            }
        }
    }

    /// Post a prepared submission and apply the reply.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SubmitFailed` if the backend rejects it.
    pub async fn send(&mut self, request: SubmitRequest) -> Result<bool, SessionError> {
        let result = self.backend.submit(&request.record).await;
        self.apply_submitted(request.ticket, result)
    }

    /// Finalize for `reason` and post the record.
    ///
    /// Returns `Ok(false)` if finalization had already begun elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` when no user is available to
    /// attribute the record to, or `SessionError::SubmitFailed`.
    pub async fn finalize(&mut self, reason: FinalizeReason) -> Result<bool, SessionError> {
        match self.begin_finalize(reason) {
            Some(request) => self.send(request).await,
            None if self.state == SessionState::Finalizing && self.record.is_none() => {
                Err(SessionError::NotSignedIn)
            }
            None => Ok(false),
        }
    }

    /// Confirm and submit in one step.
    ///
    /// Returns `Ok(false)` if nothing was sent (not confirming, or already finalizing).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SubmitFailed` if the backend rejects it.
    pub async fn confirm_and_send(&mut self) -> Result<bool, SessionError> {
        match self.confirm_submit() {
            Some(request) => self.send(request).await,
            None => Ok(false),
        }
    }

    /// Release timers and observation regardless of state. Later replies are discarded.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.countdown.cancel();
        self.monitor.detach();
        self.navigator.dispose_editor();
        self.torn_down = true;
        self.generation += 1;
        tracing::debug!(state = ?self.state, "session torn down");
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let active_id = self.navigator.active_id();
        let questions = self
            .navigator
            .questions()
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionSummary {
                id: q.id(),
                number: index + 1,
                kind: q.kind(),
                answered: self.answers.is_answered(q.id()),
                active: Some(q.id()) == active_id,
            })
            .collect();
        let active = self.navigator.active().map(|question| {
            let editor = self.navigator.editor();
            ActiveQuestion {
                question: question.clone(),
                answer: self.answers.get(question.id()).cloned(),
                editor_text: editor.map(|e| e.text().to_owned()),
                editor_language: editor.map(|e| e.language().to_owned()),
                is_last: self.navigator.is_last(),
            }
        });
        let all = self.navigator.questions();
        SessionSnapshot {
            state: self.state,
            timer_label: self.countdown.label(),
            remaining_secs: self.countdown.remaining_secs(),
            violations: self.monitor.violations(),
            max_violations: self.monitor.limit(),
            questions,
            active,
            mcq_answered: self.answers.answered_of_kind(all, QuestionKind::MultipleChoice),
            coding_answered: self.answers.answered_of_kind(all, QuestionKind::Coding),
            notices: self.notices.active().to_vec(),
            finalize_reason: self.finalize_reason,
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("questions_len", &self.navigator.questions().len())
            .field("active", &self.navigator.active_id())
            .field("remaining_secs", &self.countdown.remaining_secs())
            .field("violations", &self.monitor.violations())
            .field("generation", &self.generation)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

/// Issue the backend call matching `source`.
///
/// # Errors
///
/// Returns `BackendError` from the backend.
pub async fn fetch_questions(
    backend: &dyn AssessmentBackend,
    source: &LoadSource,
) -> Result<Vec<Question>, BackendError> {
    match source {
        LoadSource::Retake(test_id) => backend.fetch_test(test_id).await,
        LoadSource::Upload(document) => backend.upload_document(document).await,
    }
}
