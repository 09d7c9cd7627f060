use chrono::{DateTime, Utc};

use assess_core::model::{Answer, Question, QuestionRecord, SubmissionRecord, UserId};

use super::answers::AnswerStore;
use super::navigator::QuestionNavigator;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_secs(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    }
}

fn question_record(question: &Question, answers: &AnswerStore, time_spent: f64) -> QuestionRecord {
    let answer = answers.get(question.id());
    let time_spent_seconds = round_secs(time_spent);
    match question {
        Question::MultipleChoice(q) => {
            let user_answer = answer.and_then(Answer::as_option);
            QuestionRecord::MultipleChoice {
                id: q.id,
                text: q.text.clone(),
                time_spent_seconds,
                options: q.options.clone(),
                correct_answer: q.correct_answer,
                user_answer,
                is_correct: user_answer == Some(q.correct_answer),
            }
        }
        Question::Coding(q) => QuestionRecord::Coding {
            id: q.id,
            text: q.text.clone(),
            time_spent_seconds,
            language: q.language_or_default().to_owned(),
            user_answer: answer.and_then(Answer::as_code).map(str::to_owned),
        },
    }
}

/// Snapshot the navigator and answers into the record sent to the backend.
///
/// The caller settles the active question's time and captures the editor first.
#[must_use]
pub fn build_submission(
    user_id: UserId,
    created_at: DateTime<Utc>,
    navigator: &QuestionNavigator,
    answers: &AnswerStore,
) -> SubmissionRecord {
    let questions: Vec<QuestionRecord> = navigator
        .questions()
        .iter()
        .map(|q| question_record(q, answers, navigator.time_spent(q.id())))
        .collect();
    let time_taken = round_secs(navigator.total_time(created_at));
    SubmissionRecord::new(user_id, created_at, time_taken, questions)
}
