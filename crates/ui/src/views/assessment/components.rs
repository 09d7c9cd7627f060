use dioxus::prelude::*;

use services::SessionCommand;

use crate::vm::{AssessmentVm, NoticeVm, QuestionBodyVm, QuestionVm};

/// Pure rendering of a session; every interaction is reported through `on_command`.
#[component]
pub fn AssessmentScreen(vm: AssessmentVm, on_command: EventHandler<SessionCommand>) -> Element {
    let timer_class = if vm.low_time { "timer timer--low" } else { "timer" };
    let interactive = vm.is_interactive();

    rsx! {
        div { id: "assessment-root", class: "page assessment-page",
            header { class: "assessment-header",
                span { class: "{timer_class}", id: "assessment-timer", "{vm.timer_label}" }
                span { class: "violations", "{vm.violations_label}" }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: !interactive,
                    onclick: move |_| on_command.call(SessionCommand::RequestSubmit),
                    "Submit test"
                }
            }

            NoticeList { notices: vm.notices.clone() }

            if let Some(status) = vm.status {
                p { class: "assessment-status", "{status}" }
            }
            if vm.can_retry() {
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_command.call(SessionCommand::RetrySubmit),
                    "Retry submission"
                }
            }

            div { class: "assessment-body",
                nav { class: "palette",
                    for item in vm.palette.iter().cloned() {
                        button {
                            key: "{item.id}",
                            class: "{item.class}",
                            r#type: "button",
                            disabled: !interactive,
                            onclick: move |_| on_command.call(SessionCommand::Select(item.id)),
                            "{item.label}"
                        }
                    }
                }
                if let Some(question) = vm.question.clone() {
                    QuestionPanel { question, interactive, on_command }
                }
            }

            if vm.is_confirming() {
                div { class: "modal-backdrop",
                    div { class: "modal", role: "dialog",
                        h3 { "Submit your test?" }
                        p { "{vm.confirm_counts}" }
                        div { class: "modal-actions",
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| on_command.call(SessionCommand::CancelSubmit),
                                "Keep working"
                            }
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| on_command.call(SessionCommand::ConfirmSubmit),
                                "Submit"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionPanel(
    question: QuestionVm,
    interactive: bool,
    on_command: EventHandler<SessionCommand>,
) -> Element {
    let QuestionVm {
        heading,
        text,
        body,
        is_last,
    } = question;
    rsx! {
        section { class: "question-panel",
            h3 { "{heading}" }
            p { class: "question-text", "{text}" }
            match body {
                QuestionBodyVm::MultipleChoice { options } => rsx! {
                    ul { class: "options",
                        for option in options {
                            li { key: "{option.index}",
                                label { class: option_class(option.selected),
                                    input {
                                        r#type: "radio",
                                        name: "answer",
                                        checked: option.selected,
                                        disabled: !interactive,
                                        onchange: move |_| on_command.call(SessionCommand::ChooseOption(option.index)),
                                    }
                                    "{option.label}"
                                }
                            }
                        }
                    }
                },
                QuestionBodyVm::Coding { code, language, languages, test_cases } => rsx! {
                    div { class: "coding",
                        select {
                            class: "language-select",
                            value: "{language}",
                            disabled: !interactive,
                            onchange: move |evt| on_command.call(SessionCommand::SetLanguage(evt.value())),
                            for lang in languages {
                                option { key: "{lang}", value: "{lang}", selected: lang == language, "{lang}" }
                            }
                        }
                        textarea {
                            class: "code-editor",
                            spellcheck: false,
                            disabled: !interactive,
                            value: "{code}",
                            oninput: move |evt| on_command.call(SessionCommand::EditCode(evt.value())),
                        }
                        if !test_cases.is_empty() {
                            table { class: "test-cases",
                                thead { tr { th { "Input" } th { "Expected output" } } }
                                tbody {
                                    for (input, expected) in test_cases {
                                        tr { td { "{input}" } td { "{expected}" } }
                                    }
                                }
                            }
                        }
                    }
                },
            }
            if !is_last {
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !interactive,
                    onclick: move |_| on_command.call(SessionCommand::Next),
                    "Next"
                }
            }
        }
    }
}

fn option_class(selected: bool) -> &'static str {
    if selected {
        "option option--selected"
    } else {
        "option"
    }
}

#[component]
pub fn NoticeList(notices: Vec<NoticeVm>) -> Element {
    rsx! {
        div { class: "toasts",
            for notice in notices {
                div { key: "{notice.id}", class: "{notice.class}", "{notice.message}" }
            }
        }
    }
}
