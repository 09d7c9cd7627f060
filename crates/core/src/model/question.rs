use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionId;

/// Languages offered by the code editor, in menu order.
pub const SUPPORTED_LANGUAGES: [&str; 5] = ["javascript", "python", "c", "cpp", "java"];

/// Editor language used when a coding question does not carry one.
pub const DEFAULT_LANGUAGE: &str = "javascript";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("test contains no questions")]
    Empty,
    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    MultipleChoice,
    Coding,
}

impl QuestionKind {
    /// Wire tag used by the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "mcq",
            QuestionKind::Coding => "coding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoice {
    pub id: QuestionId,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingQuestion {
    pub id: QuestionId,
    pub text: String,
    /// Starter snippet shown in the editor before the learner types anything.
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<TestCase>,
}

impl CodingQuestion {
    #[must_use]
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

/// A question as delivered by the backend, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "mcq")]
    MultipleChoice(MultipleChoice),
    #[serde(rename = "coding")]
    Coding(CodingQuestion),
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        match self {
            Question::MultipleChoice(q) => q.id,
            Question::Coding(q) => q.id,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.text,
            Question::Coding(q) => &q.text,
        }
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice(_) => QuestionKind::MultipleChoice,
            Question::Coding(_) => QuestionKind::Coding,
        }
    }

    #[must_use]
    pub fn as_coding(&self) -> Option<&CodingQuestion> {
        match self {
            Question::Coding(q) => Some(q),
            Question::MultipleChoice(_) => None,
        }
    }

    pub fn as_coding_mut(&mut self) -> Option<&mut CodingQuestion> {
        match self {
            Question::Coding(q) => Some(q),
            Question::MultipleChoice(_) => None,
        }
    }

    #[must_use]
    pub fn as_multiple_choice(&self) -> Option<&MultipleChoice> {
        match self {
            Question::MultipleChoice(q) => Some(q),
            Question::Coding(_) => None,
        }
    }
}

/// Check the set-level invariants a session relies on.
///
/// # Errors
///
/// Returns `QuestionSetError::Empty` for an empty list and
/// `QuestionSetError::DuplicateId` when two questions share an id.
pub fn validate_question_set(questions: &[Question]) -> Result<(), QuestionSetError> {
    if questions.is_empty() {
        return Err(QuestionSetError::Empty);
    }
    let mut seen = HashSet::with_capacity(questions.len());
    for question in questions {
        if !seen.insert(question.id()) {
            return Err(QuestionSetError::DuplicateId(question.id()));
        }
    }
    Ok(())
}
