use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use reqwest::StatusCode;

use assess_core::model::{
    Answer, CodingQuestion, MultipleChoice, Question, QuestionId, QuestionRecord,
    SubmissionRecord, TestId, TestSummary, UserId, UserRecord,
};
use assess_core::time::fixed_clock;
use services::session::RequestTicket;
use services::{
    AppServices, AppState, AssessmentBackend, BackendError, Document, FinalizeReason, HistoryError,
    LoadSource, SessionCommand, SessionConfig, SessionController, SessionError, SessionState,
    StoragePlatform, SubmitAck,
};
use storage::{InMemoryStore, Storage};

#[derive(Default)]
struct FakeBackend {
    questions: Mutex<Vec<Question>>,
    fail_load: AtomicBool,
    fail_submit: AtomicBool,
    submits: AtomicUsize,
    records: Mutex<Vec<SubmissionRecord>>,
}

impl FakeBackend {
    fn with_questions(questions: Vec<Question>) -> Arc<Self> {
        let backend = Self::default();
        *backend.questions.lock().unwrap() = questions;
        Arc::new(backend)
    }

    fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    fn last_record(&self) -> SubmissionRecord {
        self.records.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl AssessmentBackend for FakeBackend {
    async fn fetch_test(&self, _test_id: &TestId) -> Result<Vec<Question>, BackendError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(BackendError::HttpStatus(StatusCode::BAD_GATEWAY));
        }
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn upload_document(&self, _document: &Document) -> Result<Vec<Question>, BackendError> {
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn submit(&self, record: &SubmissionRecord) -> Result<SubmitAck, BackendError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(BackendError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(SubmitAck {
            message: "Test submitted successfully".into(),
            id: Some("abc123".into()),
        })
    }

    async fn history(&self, _user_id: &UserId) -> Result<Vec<TestSummary>, BackendError> {
        Ok(Vec::new())
    }

    async fn bookmarked(&self, _user_id: &UserId) -> Result<Vec<TestSummary>, BackendError> {
        Ok(Vec::new())
    }

    async fn set_bookmark(&self, _test_id: &TestId, _bookmarked: bool) -> Result<(), BackendError> {
        Ok(())
    }
}

fn mcq(id: u64, correct_answer: usize) -> Question {
    Question::MultipleChoice(MultipleChoice {
        id: QuestionId::new(id),
        text: format!("Question {id}"),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer,
    })
}

fn coding(id: u64) -> Question {
    Question::Coding(CodingQuestion {
        id: QuestionId::new(id),
        text: "Reverse a string".into(),
        code: "function reverse(s) {}".into(),
        language: None,
        test_cases: Vec::new(),
    })
}

fn sample_set() -> Vec<Question> {
    vec![mcq(1, 2), mcq(2, 0), mcq(3, 1), coding(4)]
}

struct Harness {
    platform: Arc<StoragePlatform>,
    app_state: Arc<AppState>,
    backend: Arc<FakeBackend>,
    controller: SessionController,
}

async fn harness(questions: Vec<Question>, signed_in: bool) -> Harness {
    let platform = Arc::new(StoragePlatform::new(Arc::new(InMemoryStore::new()), fixed_clock()));
    let app_state = Arc::new(AppState::load(platform.clone()).await.unwrap());
    if signed_in {
        let user = UserRecord::new(UserId::new("u1"), "Ada", "ada@example.com");
        app_state.set_user(user).await.unwrap();
    }
    let backend = FakeBackend::with_questions(questions);
    let controller = SessionController::new(
        platform.clone(),
        app_state.clone(),
        backend.clone(),
        SessionConfig::default(),
    );
    Harness {
        platform,
        app_state,
        backend,
        controller,
    }
}

async fn running(questions: Vec<Question>) -> Harness {
    let mut h = harness(questions, true).await;
    h.controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .unwrap();
    assert_eq!(h.controller.state(), SessionState::Running);
    h
}

#[tokio::test]
async fn load_selects_first_question_and_starts_timers() {
    let h = running(sample_set()).await;
    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.timer_label, "45:00");
    assert_eq!(snapshot.questions.len(), 4);
    assert!(snapshot.questions[0].active);
    assert_eq!(h.controller.navigator().active_id(), Some(QuestionId::new(1)));
    assert!(h.controller.monitor().is_armed());
}

#[tokio::test]
async fn empty_question_set_fails_load() {
    let mut h = harness(Vec::new(), true).await;
    let err = h
        .controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::QuestionSet(_)));
    assert_eq!(h.controller.state(), SessionState::LoadFailed);
    assert_eq!(h.controller.notices().len(), 1);
}

#[tokio::test]
async fn network_error_fails_load() {
    let mut h = harness(sample_set(), true).await;
    h.backend.fail_load.store(true, Ordering::SeqCst);
    let err = h
        .controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::LoadFailed(_)));
    assert_eq!(h.controller.state(), SessionState::LoadFailed);
}

#[tokio::test]
async fn upload_source_loads_generated_questions() {
    let mut h = harness(sample_set(), true).await;
    let document = Document::pdf("notes.pdf", b"%PDF-1.4".to_vec()).unwrap();
    h.controller.load(&LoadSource::Upload(document)).await.unwrap();
    assert_eq!(h.controller.state(), SessionState::Running);
}

#[tokio::test]
async fn scores_multiple_choice_and_keeps_editor_text() {
    let mut h = running(sample_set()).await;

    h.controller.choose_option(2).unwrap();
    h.platform.advance(Duration::milliseconds(1600));
    h.controller.next().unwrap();
    h.controller.choose_option(0).unwrap();
    h.controller.next().unwrap();
    h.controller.choose_option(3).unwrap();
    h.controller.next().unwrap();
    h.controller.edit_code("fn main() {}".into()).unwrap();
    h.platform.advance(Duration::milliseconds(3400));

    h.controller.request_submit().unwrap();
    assert!(h.controller.confirm_and_send().await.unwrap());
    assert_eq!(h.controller.state(), SessionState::Submitted);

    let record = h.backend.last_record();
    assert_eq!(record.num_correct(), 2);
    assert_eq!(record.total_questions(), 4);
    assert_eq!(record.time_taken_seconds(), 5);
    let spent: u64 = record.questions().iter().map(QuestionRecord::time_spent_seconds).sum();
    assert!(spent.abs_diff(record.time_taken_seconds()) <= 1);
    match &record.questions()[3] {
        QuestionRecord::Coding { user_answer, .. } => {
            assert_eq!(user_answer.as_deref(), Some("fn main() {}"));
        }
        other => panic!("expected coding record, got {other:?}"),
    }
}

#[tokio::test]
async fn submitting_with_no_answers_still_sends_a_record() {
    let mut h = running(sample_set()).await;
    h.controller.request_submit().unwrap();
    assert!(h.controller.confirm_and_send().await.unwrap());

    let record = h.backend.last_record();
    assert_eq!(record.num_correct(), 0);
    assert_eq!(record.total_questions(), 4);
    assert!(record.questions()[..3].iter().all(|q| !q.is_answered()));
}

#[tokio::test]
async fn double_confirm_sends_once() {
    let mut h = running(sample_set()).await;
    h.controller.request_submit().unwrap();
    let first = h.controller.confirm_submit();
    let second = h.controller.confirm_submit();
    assert!(first.is_some());
    assert!(second.is_none());
    assert!(h.controller.begin_finalize(FinalizeReason::TimedOut).is_none());

    h.controller.send(first.unwrap()).await.unwrap();
    assert_eq!(h.backend.submits(), 1);
    assert!(!h.controller.confirm_and_send().await.unwrap());
    assert_eq!(h.backend.submits(), 1);
}

#[tokio::test]
async fn cancel_submit_resumes_countdown() {
    let mut h = running(sample_set()).await;
    h.controller.tick();
    h.controller.request_submit().unwrap();
    h.controller.tick();
    assert_eq!(h.controller.countdown().remaining_secs(), 2699);

    h.controller.cancel_submit().unwrap();
    h.controller.tick();
    assert_eq!(h.controller.state(), SessionState::Running);
    assert_eq!(h.controller.countdown().remaining_secs(), 2698);
}

#[tokio::test]
async fn unknown_id_clears_active_question() {
    let mut h = running(sample_set()).await;
    h.controller.select(QuestionId::new(99)).unwrap();
    let snapshot = h.controller.snapshot();
    assert!(snapshot.active.is_none());
    assert!(snapshot.questions.iter().all(|q| !q.active));
}

#[tokio::test]
async fn out_of_range_option_is_rejected() {
    let mut h = running(sample_set()).await;
    let err = h.controller.choose_option(7).unwrap_err();
    assert!(matches!(err, SessionError::InvalidOption { index: 7 }));
    assert_eq!(h.controller.answers().get(QuestionId::new(1)), None);
}

#[tokio::test]
async fn language_change_on_coding_question_updates_editor() {
    let mut h = running(sample_set()).await;
    h.controller.set_language("python").unwrap();
    assert!(h.controller.navigator().editor().is_none());

    h.controller.select(QuestionId::new(4)).unwrap();
    h.controller.set_language("python").unwrap();
    let editor = h.controller.navigator().editor().unwrap();
    assert_eq!(editor.language(), "python");
    assert_eq!(editor.text(), "function reverse(s) {}");
}

#[tokio::test]
async fn timeout_finalizes_without_confirmation() {
    let mut h = running(sample_set()).await;
    let mut request = None;
    for _ in 0..2700 {
        if let Some(found) = h.controller.tick() {
            assert!(request.is_none(), "expiry fired twice");
            request = Some(found);
        }
    }
    assert_eq!(h.controller.snapshot().timer_label, "00:00");
    assert_eq!(h.controller.finalize_reason(), Some(FinalizeReason::TimedOut));
    h.controller.send(request.unwrap()).await.unwrap();
    assert_eq!(h.controller.state(), SessionState::Submitted);
    assert_eq!(h.backend.submits(), 1);
}

#[tokio::test]
async fn sixth_tab_switch_finalizes() {
    let mut h = running(sample_set()).await;
    for expected in (0..=4).rev() {
        assert!(h.controller.visibility_changed(true).is_none());
        assert!(h.controller.visibility_changed(false).is_none());
        let latest = h.controller.notices().last().unwrap();
        assert_eq!(latest.message, format!("Don't change tab! Remaining: {expected}"));
    }
    let request = h.controller.visibility_changed(true).unwrap();
    assert_eq!(
        h.controller.finalize_reason(),
        Some(FinalizeReason::IntegrityViolation)
    );
    assert!(h.controller.visibility_changed(true).is_none());
    h.controller.send(request).await.unwrap();
    assert_eq!(h.backend.submits(), 1);
}

#[tokio::test]
async fn failed_submit_stays_finalizing_until_retry() {
    let mut h = running(sample_set()).await;
    h.backend.fail_submit.store(true, Ordering::SeqCst);
    h.controller.request_submit().unwrap();
    let err = h.controller.confirm_and_send().await.unwrap_err();
    assert!(matches!(err, SessionError::SubmitFailed(_)));
    assert_eq!(h.controller.state(), SessionState::Finalizing);
    let first_record = h.controller.record().cloned().unwrap();

    h.controller.tick();
    assert_eq!(h.backend.submits(), 1);

    h.backend.fail_submit.store(false, Ordering::SeqCst);
    let retry = h.controller.retry_submit().unwrap();
    assert_eq!(retry.record, first_record);
    h.controller.send(retry).await.unwrap();
    assert_eq!(h.controller.state(), SessionState::Submitted);
    assert_eq!(h.backend.submits(), 2);
}

#[tokio::test]
async fn finalize_without_user_reports_not_signed_in() {
    let mut h = harness(sample_set(), false).await;
    h.controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .unwrap();
    let err = h
        .controller
        .finalize(FinalizeReason::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotSignedIn));
    assert_eq!(h.controller.state(), SessionState::Finalizing);
    assert_eq!(h.backend.submits(), 0);
}

#[tokio::test]
async fn late_sign_in_submits_time_frozen_at_finalize() {
    let mut h = harness(sample_set(), false).await;
    h.controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .unwrap();
    h.platform.advance(Duration::seconds(10));
    let err = h
        .controller
        .finalize(FinalizeReason::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotSignedIn));

    h.platform.advance(Duration::seconds(60));
    let user = UserRecord::new(UserId::new("u1"), "Ada", "ada@example.com");
    h.app_state.set_user(user).await.unwrap();
    let request = h.controller.retry_submit().unwrap();

    let spent: u64 = request
        .record
        .questions()
        .iter()
        .map(QuestionRecord::time_spent_seconds)
        .sum();
    assert_eq!(spent, 10);
    assert_eq!(request.record.time_taken_seconds(), 10);
    h.controller.send(request).await.unwrap();
    assert_eq!(h.controller.state(), SessionState::Submitted);
}

#[tokio::test]
async fn blur_and_hidden_from_one_switch_count_once() {
    let mut h = running(sample_set()).await;
    assert!(h.controller.visibility_changed(true).is_none());
    assert!(h.controller.visibility_changed(true).is_none());
    assert_eq!(h.controller.monitor().violations(), 1);
    assert_eq!(h.controller.snapshot().violations, 1);

    h.controller.visibility_changed(false);
    h.controller.visibility_changed(true);
    assert_eq!(h.controller.monitor().violations(), 2);
}

#[tokio::test]
async fn teardown_discards_late_replies() {
    let mut h = harness(sample_set(), true).await;
    let ticket: RequestTicket = h.controller.begin_load().unwrap();
    h.controller.teardown();

    let applied = h.controller.apply_loaded(ticket, Ok(sample_set())).unwrap();
    assert!(!applied);
    assert_eq!(h.controller.state(), SessionState::Loading);
    assert!(h.controller.tick().is_none());
    assert!(h.controller.visibility_changed(true).is_none());
}

#[tokio::test]
async fn teardown_mid_session_stops_timers() {
    let mut h = running(sample_set()).await;
    h.controller.select(QuestionId::new(4)).unwrap();
    h.controller.teardown();

    assert!(h.controller.navigator().editor().is_none());
    assert!(!h.controller.monitor().is_armed());
    assert!(!h.controller.countdown().is_running());
    assert!(matches!(
        h.controller.select(QuestionId::new(1)),
        Err(SessionError::InvalidState(SessionState::Running))
    ));
    assert_eq!(h.controller.answers().get(QuestionId::new(4)), None::<&Answer>);
}

async fn services_with(backend: Arc<FakeBackend>) -> AppServices {
    let services = AppServices::from_parts(
        Storage::in_memory(),
        fixed_clock(),
        backend,
        SessionConfig::default(),
    )
    .await
    .unwrap();
    let user = UserRecord::new(UserId::new("u1"), "Ada", "ada@example.com");
    services.app_state().set_user(user).await.unwrap();
    services
}

#[tokio::test(start_paused = true)]
async fn runner_submits_confirmed_session() {
    let backend = FakeBackend::with_questions(sample_set());
    let services = services_with(backend.clone()).await;
    let runner = services.start_session(LoadSource::Retake(TestId::new("t1")));
    let mut snapshots = runner.snapshots();

    snapshots
        .wait_for(|s| s.state == SessionState::Running)
        .await
        .unwrap();
    assert_eq!(services.platform().visibility_observers(), 1);

    assert!(runner.send(SessionCommand::ChooseOption(2)));
    assert!(runner.send(SessionCommand::RequestSubmit));
    assert!(runner.send(SessionCommand::ConfirmSubmit));
    assert!(runner.send(SessionCommand::ConfirmSubmit));
    snapshots
        .wait_for(|s| s.state == SessionState::Submitted)
        .await
        .unwrap();

    let controller = runner.finished().await.unwrap();
    assert!(controller.is_torn_down());
    assert_eq!(backend.submits(), 1);
    assert_eq!(backend.last_record().num_correct(), 1);
    assert_eq!(services.platform().visibility_observers(), 0);
}

#[tokio::test(start_paused = true)]
async fn runner_finalizes_on_sixth_hidden_page() {
    let backend = FakeBackend::with_questions(sample_set());
    let services = services_with(backend.clone()).await;
    let platform = services.platform();
    let runner = services.start_session(LoadSource::Retake(TestId::new("t1")));
    let mut snapshots = runner.snapshots();
    snapshots
        .wait_for(|s| s.state == SessionState::Running)
        .await
        .unwrap();

    for count in 1..=5 {
        platform.report_visibility(true);
        snapshots.wait_for(|s| s.violations == count).await.unwrap();
        platform.report_visibility(false);
    }
    platform.report_visibility(true);
    let last = snapshots
        .wait_for(|s| s.state == SessionState::Submitted)
        .await
        .unwrap()
        .clone();
    assert_eq!(last.finalize_reason, Some(FinalizeReason::IntegrityViolation));

    runner.finished().await.unwrap();
    assert_eq!(backend.submits(), 1);
}

#[tokio::test(start_paused = true)]
async fn runner_counts_each_queued_switch_once() {
    let backend = FakeBackend::with_questions(sample_set());
    let services = services_with(backend.clone()).await;
    let platform = services.platform();
    let runner = services.start_session(LoadSource::Retake(TestId::new("t1")));
    let mut snapshots = runner.snapshots();
    snapshots
        .wait_for(|s| s.state == SessionState::Running)
        .await
        .unwrap();

    for hidden in [true, true, false, true, false, false, true, true] {
        platform.report_visibility(hidden);
    }
    snapshots.wait_for(|s| s.violations >= 3).await.unwrap();
    assert_eq!(runner.latest().violations, 3);
    assert_eq!(runner.latest().state, SessionState::Running);

    runner.teardown();
    runner.finished().await.unwrap();
    assert_eq!(backend.submits(), 0);
}

#[tokio::test(start_paused = true)]
async fn runner_teardown_releases_observation() {
    let backend = FakeBackend::with_questions(sample_set());
    let services = services_with(backend.clone()).await;
    let runner = services.start_session(LoadSource::Retake(TestId::new("t1")));
    let mut snapshots = runner.snapshots();
    snapshots
        .wait_for(|s| s.state == SessionState::Running)
        .await
        .unwrap();

    runner.teardown();
    let controller = runner.finished().await.unwrap();
    assert!(controller.is_torn_down());
    assert_eq!(controller.state(), SessionState::Running);
    assert_eq!(services.platform().visibility_observers(), 0);
    assert_eq!(backend.submits(), 0);
}

#[tokio::test]
async fn history_requires_a_signed_in_user() {
    let services = AppServices::from_parts(
        Storage::in_memory(),
        fixed_clock(),
        FakeBackend::with_questions(Vec::new()),
        SessionConfig::default(),
    )
    .await
    .unwrap();
    let err = services.history().list_history().await.unwrap_err();
    assert!(matches!(err, HistoryError::NotSignedIn));

    let user = UserRecord::new(UserId::new("u1"), "Ada", "ada@example.com");
    services.app_state().set_user(user).await.unwrap();
    assert!(services.history().list_history().await.unwrap().is_empty());
}
