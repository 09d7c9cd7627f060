use assess_core::model::{QuestionId, TestId};
use services::{LoadSource, SessionState};

use super::test_harness::{ViewKind, setup_view_harness, test_services};
use crate::vm::map_assessment;

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_signed_in_user() {
    let mut harness = setup_view_harness(ViewKind::Home, true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Signed in as Grace"), "missing greeting in {html}");
    assert!(html.contains("Retake"), "missing retake form in {html}");
    assert!(html.contains("Generate test"), "missing upload form in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_signed_out() {
    let mut harness = setup_view_harness(ViewKind::Home, false).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Not signed in"), "missing signed-out text in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_renders_rows() {
    let mut harness = setup_view_harness(ViewKind::History, true).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Networking basics"), "missing title in {html}");
    assert!(html.contains("50%"), "missing score in {html}");
    assert!(html.contains("Unbookmark"), "missing bookmark toggle in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn history_view_smoke_requires_sign_in() {
    let mut harness = setup_view_harness(ViewKind::History, false).await;
    harness.rebuild();
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Sign in to see your tests."), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_without_source_offers_home_link() {
    let mut harness = setup_view_harness(ViewKind::Assessment, true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("No test selected"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_screen_smoke_renders_running_session() {
    let services = test_services(true).await;
    let mut controller = services.new_session();
    controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .expect("load");
    controller.choose_option(0).expect("choose");
    controller.select(QuestionId::new(2)).expect("select");
    assert_eq!(controller.state(), SessionState::Running);

    let vm = map_assessment(&controller.snapshot());
    let mut harness = setup_view_harness(ViewKind::Screen(vm), true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("45:00"), "missing timer in {html}");
    assert!(html.contains("Question 2 of 2"), "missing heading in {html}");
    assert!(html.contains("palette-item--answered"), "missing answered marker in {html}");
    assert!(html.contains("def add(a, b):"), "missing starter code in {html}");
    assert!(html.contains("Tab switches: 0/5"), "missing violation counter in {html}");
    assert!(!html.contains(">Next<"), "last question should not offer next in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_screen_smoke_renders_confirmation_counts() {
    let services = test_services(true).await;
    let mut controller = services.new_session();
    controller
        .load(&LoadSource::Retake(TestId::new("t1")))
        .await
        .expect("load");
    controller.choose_option(1).expect("choose");
    controller.request_submit().expect("request");

    let vm = map_assessment(&controller.snapshot());
    let mut harness = setup_view_harness(ViewKind::Screen(vm), true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Submit your test?"), "missing dialog in {html}");
    assert!(
        html.contains("MCQ answered: 1/1 | Coding answered: 0/1"),
        "missing counts in {html}"
    );
}
