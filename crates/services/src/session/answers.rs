use std::collections::HashMap;

use assess_core::model::{Answer, Question, QuestionId, QuestionKind};

/// Current answer per question; last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Answer> {
        self.answers.get(&id)
    }

    pub fn set(&mut self, id: QuestionId, answer: Answer) {
        self.answers.insert(id, answer);
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.answers.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// How many of `questions` of the given kind have an answer.
    #[must_use]
    pub fn answered_of_kind(&self, questions: &[Question], kind: QuestionKind) -> usize {
        questions
            .iter()
            .filter(|q| q.kind() == kind && self.is_answered(q.id()))
            .count()
    }
}
