use assess_core::model::{Answer, Question, QuestionId, QuestionKind, SUPPORTED_LANGUAGES};
use services::session::{ActiveQuestion, QuestionSummary};
use services::{FinalizeReason, NoticeKind, SessionSnapshot, SessionState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteItemVm {
    pub id: QuestionId,
    pub label: String,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestionBodyVm {
    MultipleChoice {
        options: Vec<OptionVm>,
    },
    Coding {
        code: String,
        language: String,
        languages: Vec<&'static str>,
        test_cases: Vec<(String, String)>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub heading: String,
    pub text: String,
    pub body: QuestionBodyVm,
    pub is_last: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoticeVm {
    pub id: u64,
    pub message: String,
    pub class: &'static str,
}

/// Everything the assessment screen renders, derived from one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentVm {
    pub state: SessionState,
    pub timer_label: String,
    pub low_time: bool,
    pub violations_label: String,
    pub palette: Vec<PaletteItemVm>,
    pub question: Option<QuestionVm>,
    pub confirm_counts: String,
    pub status: Option<&'static str>,
    pub notices: Vec<NoticeVm>,
}

impl AssessmentVm {
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.state == SessionState::Running
    }

    #[must_use]
    pub fn is_confirming(&self) -> bool {
        self.state == SessionState::AwaitingConfirmation
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.state == SessionState::Finalizing
    }
}

const LOW_TIME_SECS: u32 = 300;

#[must_use]
pub fn map_assessment(snapshot: &SessionSnapshot) -> AssessmentVm {
    let mcq_total = count_kind(&snapshot.questions, false);
    let coding_total = count_kind(&snapshot.questions, true);
    AssessmentVm {
        state: snapshot.state,
        timer_label: snapshot.timer_label.clone(),
        low_time: snapshot.state == SessionState::Running && snapshot.remaining_secs <= LOW_TIME_SECS,
        violations_label: format!(
            "Tab switches: {}/{}",
            snapshot.violations.min(snapshot.max_violations),
            snapshot.max_violations
        ),
        palette: snapshot.questions.iter().map(map_palette_item).collect(),
        question: snapshot.active.as_ref().map(|active| {
            let number = snapshot
                .questions
                .iter()
                .find(|q| q.active)
                .map_or(0, |q| q.number);
            map_question(active, number, snapshot.questions.len())
        }),
        confirm_counts: format!(
            "MCQ answered: {}/{mcq_total} | Coding answered: {}/{coding_total}",
            snapshot.mcq_answered, snapshot.coding_answered
        ),
        status: status_message(snapshot.state, snapshot.finalize_reason),
        notices: snapshot
            .notices
            .iter()
            .map(|notice| NoticeVm {
                id: notice.id,
                message: notice.message.clone(),
                class: match notice.kind {
                    NoticeKind::Success => "toast toast--success",
                    NoticeKind::Error => "toast toast--error",
                },
            })
            .collect(),
    }
}

fn count_kind(questions: &[QuestionSummary], coding: bool) -> usize {
    questions
        .iter()
        .filter(|q| (q.kind == QuestionKind::Coding) == coding)
        .count()
}

fn map_palette_item(summary: &QuestionSummary) -> PaletteItemVm {
    let class = match (summary.active, summary.answered) {
        (true, _) => "palette-item palette-item--active",
        (false, true) => "palette-item palette-item--answered",
        (false, false) => "palette-item",
    };
    PaletteItemVm {
        id: summary.id,
        label: summary.number.to_string(),
        class,
    }
}

fn map_question(active: &ActiveQuestion, number: usize, total: usize) -> QuestionVm {
    let body = match &active.question {
        Question::MultipleChoice(mcq) => {
            let selected = active.answer.as_ref().and_then(Answer::as_option);
            QuestionBodyVm::MultipleChoice {
                options: mcq
                    .options
                    .iter()
                    .enumerate()
                    .map(|(index, label)| OptionVm {
                        index,
                        label: label.clone(),
                        selected: selected == Some(index),
                    })
                    .collect(),
            }
        }
        Question::Coding(coding) => QuestionBodyVm::Coding {
            code: active
                .editor_text
                .clone()
                .unwrap_or_else(|| coding.code.clone()),
            language: active
                .editor_language
                .clone()
                .unwrap_or_else(|| coding.language_or_default().to_owned()),
            languages: SUPPORTED_LANGUAGES.to_vec(),
            test_cases: coding
                .test_cases
                .iter()
                .map(|case| (case.input.clone(), case.expected_output.clone()))
                .collect(),
        },
    };
    QuestionVm {
        heading: format!("Question {number} of {total}"),
        text: active.question.text().to_owned(),
        body,
        is_last: active.is_last,
    }
}

#[must_use]
pub fn status_message(state: SessionState, reason: Option<FinalizeReason>) -> Option<&'static str> {
    match (state, reason) {
        (SessionState::Loading, _) => Some("Loading questions..."),
        (SessionState::LoadFailed, _) => Some("Failed to load questions."),
        (SessionState::Finalizing, Some(FinalizeReason::TimedOut)) => {
            Some("Time is up. Submitting your test...")
        }
        (SessionState::Finalizing, Some(FinalizeReason::IntegrityViolation)) => {
            Some("Tab switch limit exceeded. Submitting your test...")
        }
        (SessionState::Finalizing, _) => Some("Submitting your test..."),
        (SessionState::Submitted, _) => Some("Test submitted."),
        (SessionState::Running | SessionState::AwaitingConfirmation, _) => None,
    }
}
