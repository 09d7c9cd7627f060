use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{QuestionId, UserId};

/// Per-question entry of a submission, shaped the way the scoring backend reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionRecord {
    #[serde(rename = "mcq", rename_all = "camelCase")]
    MultipleChoice {
        id: QuestionId,
        text: String,
        time_spent_seconds: u64,
        options: Vec<String>,
        correct_answer: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_answer: Option<usize>,
        is_correct: bool,
    },
    #[serde(rename = "coding", rename_all = "camelCase")]
    Coding {
        id: QuestionId,
        text: String,
        time_spent_seconds: u64,
        language: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_answer: Option<String>,
    },
}

impl QuestionRecord {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        match self {
            QuestionRecord::MultipleChoice { id, .. } | QuestionRecord::Coding { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u64 {
        match self {
            QuestionRecord::MultipleChoice {
                time_spent_seconds, ..
            }
            | QuestionRecord::Coding {
                time_spent_seconds, ..
            } => *time_spent_seconds,
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            QuestionRecord::MultipleChoice { user_answer, .. } => user_answer.is_some(),
            QuestionRecord::Coding { user_answer, .. } => user_answer.is_some(),
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, QuestionRecord::MultipleChoice { is_correct: true, .. })
    }
}

/// Immutable snapshot posted to the backend when a session is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    user_id: UserId,
    test_id: String,
    created_at: DateTime<Utc>,
    bookmark: bool,
    total_questions: usize,
    time_taken_seconds: u64,
    questions: Vec<QuestionRecord>,
    num_correct: usize,
    marks: u32,
}

impl SubmissionRecord {
    /// Assemble a record; aggregates are derived from `questions`.
    ///
    /// The test id is `test_<unix millis of created_at>`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        created_at: DateTime<Utc>,
        time_taken_seconds: u64,
        questions: Vec<QuestionRecord>,
    ) -> Self {
        let num_correct = questions.iter().filter(|q| q.is_correct()).count();
        Self {
            user_id,
            test_id: format!("test_{}", created_at.timestamp_millis()),
            created_at,
            bookmark: false,
            total_questions: questions.len(),
            time_taken_seconds,
            questions,
            num_correct,
            marks: 0,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn time_taken_seconds(&self) -> u64 {
        self.time_taken_seconds
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn num_correct(&self) -> usize {
        self.num_correct
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered()).count()
    }
}
