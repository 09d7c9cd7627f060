use dioxus::prelude::*;
use dioxus_router::use_navigator;

use services::LoadSource;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{HistoryRowVm, map_history_rows};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HistoryTab {
    All,
    Bookmarked,
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let history = ctx.history();
    let mut tab = use_signal(|| HistoryTab::All);
    let mut action_error = use_signal(|| None::<ViewError>);

    let history_for_resource = history.clone();
    let resource = use_resource(move || {
        let history = history_for_resource.clone();
        let tab = tab();
        async move {
            let tests = match tab {
                HistoryTab::All => history.list_history().await?,
                HistoryTab::Bookmarked => history.list_bookmarked().await?,
            };
            Ok::<_, ViewError>(map_history_rows(&tests))
        }
    });

    let state = view_state_from_resource(&resource);
    let tab_class = move |target: HistoryTab| {
        if tab() == target {
            "tab tab--active"
        } else {
            "tab"
        }
    };

    rsx! {
        div { class: "page history-page",
            header { class: "view-header",
                h2 { class: "view-title", "History" }
            }
            div { class: "tabs",
                button {
                    class: tab_class(HistoryTab::All),
                    r#type: "button",
                    onclick: move |_| tab.set(HistoryTab::All),
                    "All tests"
                }
                button {
                    class: tab_class(HistoryTab::Bookmarked),
                    r#type: "button",
                    onclick: move |_| tab.set(HistoryTab::Bookmarked),
                    "Bookmarked"
                }
            }
            if let Some(err) = action_error() {
                p { class: "form-error", "{err.message()}" }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { "No tests yet." }
                    } else {
                        ul { class: "history-list",
                            for row in rows {
                                HistoryRow {
                                    key: "{row.id}",
                                    row: row.clone(),
                                    on_toggle: {
                                        let history = history.clone();
                                        move |row: HistoryRowVm| {
                                            let history = history.clone();
                                            spawn(async move {
                                                match history.toggle_bookmark(&row.summary).await {
                                                    Ok(_) => {
                                                        action_error.set(None);
                                                        let mut resource = resource;
                                                        resource.restart();
                                                    }
                                                    Err(err) => action_error.set(Some(err.into())),
                                                }
                                            });
                                        }
                                    },
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn HistoryRow(row: HistoryRowVm, on_toggle: EventHandler<HistoryRowVm>) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let bookmark_label = if row.bookmarked { "Unbookmark" } else { "Bookmark" };
    let test_id = row.id.clone();
    let row_for_toggle = row.clone();

    rsx! {
        li { class: "history-row",
            div { class: "history-meta",
                h4 { "{row.title}" }
                span { class: "history-date", "{row.date}" }
                span { "{row.questions_label}" }
                span { "{row.duration_label}" }
                span { class: "history-score", "{row.score_label}" }
            }
            div { class: "history-actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_toggle.call(row_for_toggle.clone()),
                    "{bookmark_label}"
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| {
                        ctx.set_pending(LoadSource::Retake(test_id.clone()));
                        let _ = navigator.push(Route::Assessment {});
                    },
                    "Retake"
                }
            }
        }
    }
}
