use std::path::PathBuf;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use assess_core::model::TestId;
use services::{Document, LoadSource};

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut test_id = use_signal(String::new);
    let mut pdf_path = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut uploading = use_signal(|| false);

    let greeting = ctx.app_state().current_user().map_or_else(
        || "Not signed in".to_owned(),
        |user| format!("Signed in as {}", user.name),
    );
    let has_pending = ctx.has_pending();

    let ctx_for_retake = ctx.clone();
    let ctx_for_upload = ctx.clone();

    rsx! {
        div { class: "page home-page",
            header { class: "view-header",
                h2 { class: "view-title", "Assessments" }
                p { class: "view-subtitle", "{greeting}" }
            }
            div { class: "view-divider" }

            if has_pending {
                Link { class: "btn btn-primary", to: Route::Assessment {}, "Start assessment" }
            }

            section { class: "home-card",
                h3 { "Retake a test" }
                input {
                    r#type: "text",
                    placeholder: "Test id",
                    value: "{test_id}",
                    oninput: move |evt| test_id.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| match test_id().trim().parse::<TestId>() {
                        Ok(id) => {
                            error.set(None);
                            ctx_for_retake.set_pending(LoadSource::Retake(id));
                            let _ = navigator.push(Route::Assessment {});
                        }
                        Err(err) => error.set(Some(err.to_string())),
                    },
                    "Retake"
                }
            }

            section { class: "home-card",
                h3 { "Generate from a PDF" }
                input {
                    r#type: "text",
                    placeholder: "/path/to/notes.pdf",
                    value: "{pdf_path}",
                    oninput: move |evt| pdf_path.set(evt.value()),
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: uploading(),
                    onclick: move |_| {
                        let ctx = ctx_for_upload.clone();
                        let path = PathBuf::from(pdf_path().trim());
                        uploading.set(true);
                        spawn(async move {
                            match Document::read_pdf(&path).await {
                                Ok(document) => {
                                    error.set(None);
                                    ctx.set_pending(LoadSource::Upload(document));
                                    let _ = navigator.push(Route::Assessment {});
                                }
                                Err(err) => error.set(Some(err.to_string())),
                            }
                            uploading.set(false);
                        });
                    },
                    if uploading() { "Reading..." } else { "Generate test" }
                }
            }

            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
        }
    }
}
