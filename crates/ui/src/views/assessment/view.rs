use std::rc::Rc;

use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use services::{SessionCommand, SessionState};

use crate::context::AppContext;
use crate::routes::Route;
use crate::vm::{AssessmentVm, map_assessment};

use super::components::AssessmentScreen;
use super::scripts::VISIBILITY_SCRIPT;

#[component]
pub fn AssessmentView() -> Element {
    let ctx = use_context::<AppContext>();
    let runner = use_hook(|| ctx.start_pending().map(Rc::new));
    let mut vm = use_signal(|| runner.as_ref().map(|r| map_assessment(&r.latest())));
    let navigator = use_navigator();

    let runner_for_snapshots = runner.clone();
    use_future(move || {
        let runner = runner_for_snapshots.clone();
        async move {
            let Some(runner) = runner else {
                return;
            };
            let mut snapshots = runner.snapshots();
            while snapshots.changed().await.is_ok() {
                let next = map_assessment(&snapshots.borrow_and_update());
                let exit = exit_route(next.state);
                vm.set(Some(next));
                if let Some(route) = exit {
                    navigator.push(route);
                    return;
                }
            }
        }
    });

    let platform = ctx.platform();
    let has_runner = runner.is_some();
    use_future(move || {
        let platform = platform.clone();
        async move {
            if !has_runner {
                return;
            }
            let mut watcher = eval(VISIBILITY_SCRIPT);
            while let Ok(hidden) = watcher.recv::<bool>().await {
                platform.report_visibility(hidden);
            }
        }
    });

    let runner_for_drop = runner.clone();
    use_drop(move || {
        if let Some(runner) = runner_for_drop.as_ref() {
            runner.teardown();
        }
    });

    let runner_for_commands = runner.clone();
    let on_command = move |command: SessionCommand| {
        if let Some(runner) = runner_for_commands.as_ref() {
            runner.send(command);
        }
    };

    match vm() {
        None => rsx! {
            div { class: "page",
                h2 { "No test selected" }
                Link { to: Route::Home {}, "Choose a test" }
            }
        },
        Some(vm) => render_session(vm, on_command),
    }
}

/// Where the surrounding navigation takes over once the session ends on its own.
fn exit_route(state: SessionState) -> Option<Route> {
    match state {
        SessionState::Submitted => Some(Route::History {}),
        _ => None,
    }
}

fn render_session(vm: AssessmentVm, on_command: impl FnMut(SessionCommand) + 'static) -> Element {
    let finished = vm.state == SessionState::LoadFailed;
    rsx! {
        AssessmentScreen { vm, on_command }
        if finished {
            div { class: "assessment-done",
                Link { to: Route::History {}, "View history" }
                Link { to: Route::Home {}, "Back home" }
            }
        }
    }
}
