use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use assess_core::model::{
    CodingQuestion, MultipleChoice, Question, QuestionId, SubmissionRecord, TestId, TestSummary,
    TestCase, UserId, UserRecord,
};
use assess_core::time::fixed_clock;
use services::{
    AppServices, AssessmentBackend, BackendError, Document, LoadSource, SessionConfig, SubmitAck,
};
use storage::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::{AssessmentScreen, AssessmentView, HistoryView, HomeView};
use crate::vm::AssessmentVm;

pub struct FakeBackend {
    pub questions: Vec<Question>,
    pub tests: Vec<TestSummary>,
}

#[async_trait]
impl AssessmentBackend for FakeBackend {
    async fn fetch_test(&self, _test_id: &TestId) -> Result<Vec<Question>, BackendError> {
        Ok(self.questions.clone())
    }

    async fn upload_document(&self, _document: &Document) -> Result<Vec<Question>, BackendError> {
        Ok(self.questions.clone())
    }

    async fn submit(&self, _record: &SubmissionRecord) -> Result<SubmitAck, BackendError> {
        Ok(SubmitAck::default())
    }

    async fn history(&self, _user_id: &UserId) -> Result<Vec<TestSummary>, BackendError> {
        Ok(self.tests.clone())
    }

    async fn bookmarked(&self, _user_id: &UserId) -> Result<Vec<TestSummary>, BackendError> {
        Ok(self.tests.iter().filter(|t| t.bookmarked).cloned().collect())
    }

    async fn set_bookmark(&self, _test_id: &TestId, _bookmarked: bool) -> Result<(), BackendError> {
        Ok(())
    }
}

pub fn sample_questions() -> Vec<Question> {
    vec![
        Question::MultipleChoice(MultipleChoice {
            id: QuestionId::new(1),
            text: "What does HTTP stand for?".into(),
            options: vec![
                "HyperText Transfer Protocol".into(),
                "High Transfer Text Program".into(),
            ],
            correct_answer: 0,
        }),
        Question::Coding(CodingQuestion {
            id: QuestionId::new(2),
            text: "Add two numbers".into(),
            code: "def add(a, b):\n    pass".into(),
            language: Some("python".into()),
            test_cases: vec![TestCase {
                input: "1 2".into(),
                expected_output: "3".into(),
            }],
        }),
    ]
}

pub fn sample_tests() -> Vec<TestSummary> {
    vec![TestSummary {
        id: TestId::new("test_1700000000000"),
        title: "Networking basics".into(),
        date: "2023-11-14".into(),
        num_questions: 2,
        duration: 9,
        score: 50.0,
        bookmarked: true,
    }]
}

struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn launch_source(&self) -> Option<LoadSource> {
        None
    }
}

#[derive(Clone, PartialEq)]
pub enum ViewKind {
    Home,
    History,
    Assessment,
    Screen(AssessmentVm),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::History => rsx! { HistoryView {} },
        ViewKind::Assessment => rsx! { AssessmentView {} },
        ViewKind::Screen(vm) => rsx! { AssessmentScreen { vm, on_command: move |_| {} } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        for _ in 0..3 {
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(50),
                self.dom.wait_for_work(),
            )
            .await;
            self.dom.render_immediate(&mut NoOpMutations);
            self.dom.process_events();
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn test_services(signed_in: bool) -> AppServices {
    let backend = Arc::new(FakeBackend {
        questions: sample_questions(),
        tests: sample_tests(),
    });
    let services = AppServices::from_parts(
        Storage::in_memory(),
        fixed_clock(),
        backend,
        SessionConfig::default(),
    )
    .await
    .expect("build services");
    if signed_in {
        let user = UserRecord::new(UserId::new("u1"), "Grace", "grace@example.com");
        services.app_state().set_user(user).await.expect("store user");
    }
    services
}

pub async fn setup_view_harness(view: ViewKind, signed_in: bool) -> ViewHarness {
    let services = test_services(signed_in).await;
    let app = Arc::new(TestApp {
        services: services.clone(),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom, services }
}
