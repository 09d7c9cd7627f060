use std::collections::HashMap;

use chrono::{DateTime, Utc};

use assess_core::model::{Answer, Question, QuestionId};
use assess_core::time::seconds_between;

use super::answers::AnswerStore;
use super::editor::CodeEditor;

/// Ordered questions, the active one, and how long each has been looked at.
#[derive(Debug, Clone)]
pub struct QuestionNavigator {
    questions: Vec<Question>,
    active: Option<usize>,
    activated_at: Option<DateTime<Utc>>,
    time_spent: HashMap<QuestionId, f64>,
    editor: Option<CodeEditor>,
    editors_provisioned: u64,
}

impl QuestionNavigator {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            active: None,
            activated_at: None,
            time_spent: HashMap::new(),
            editor: None,
            editors_provisioned: 0,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn active(&self) -> Option<&Question> {
        self.active.map(|index| &self.questions[index])
    }

    #[must_use]
    pub fn active_id(&self) -> Option<QuestionId> {
        self.active().map(Question::id)
    }

    /// Zero-based position of the active question.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.active
            .is_some_and(|index| index + 1 == self.questions.len())
    }

    #[must_use]
    pub fn editor(&self) -> Option<&CodeEditor> {
        self.editor.as_ref()
    }

    /// How many editor surfaces have been created over the session.
    #[must_use]
    pub fn editors_provisioned(&self) -> u64 {
        self.editors_provisioned
    }

    /// Seconds recorded for `id`, excluding time still accruing on the active question.
    #[must_use]
    pub fn time_spent(&self, id: QuestionId) -> f64 {
        self.time_spent.get(&id).copied().unwrap_or(0.0)
    }

    /// Recorded time over all questions plus what is accruing right now.
    #[must_use]
    pub fn total_time(&self, now: DateTime<Utc>) -> f64 {
        let recorded: f64 = self.time_spent.values().sum();
        let accruing = match (self.active, self.activated_at) {
            (Some(_), Some(at)) => seconds_between(at, now),
            _ => 0.0,
        };
        recorded + accruing
    }

    /// Switch to `id`. Returns `false` when `id` is already active.
    ///
    /// An unknown id clears the active question.
    pub fn select(&mut self, id: QuestionId, now: DateTime<Utc>, answers: &mut AnswerStore) -> bool {
        if self.active_id() == Some(id) {
            return false;
        }

        self.settle(now);
        self.capture_editor(answers);
        self.editor = None;

        self.active = self.questions.iter().position(|q| q.id() == id);
        self.activated_at = self.active.map(|_| now);

        if self.active.is_none() {
            tracing::debug!(question_id = %id, "selected question does not exist");
            return true;
        }
        self.provision_editor(answers);
        true
    }

    /// Advance to the following question; no-op on the last one.
    pub fn next(&mut self, now: DateTime<Utc>, answers: &mut AnswerStore) -> bool {
        let Some(index) = self.active else {
            return false;
        };
        let Some(next_id) = self.questions.get(index + 1).map(Question::id) else {
            return false;
        };
        self.select(next_id, now, answers)
    }

    /// Record the active question's accrued time and restart its stamp at `now`.
    pub fn settle(&mut self, now: DateTime<Utc>) {
        let (Some(id), Some(at)) = (self.active_id(), self.activated_at) else {
            return;
        };
        *self.time_spent.entry(id).or_insert(0.0) += seconds_between(at, now);
        self.activated_at = Some(now);
    }

    /// Settle the active question and stop its clock. The question stays
    /// active for display; `total_time` no longer grows after this.
    pub fn freeze(&mut self, now: DateTime<Utc>) {
        self.settle(now);
        self.activated_at = None;
    }

    /// Copy the editor buffer into the answer store for its question.
    pub fn capture_editor(&mut self, answers: &mut AnswerStore) {
        if let Some(editor) = &self.editor {
            answers.set(editor.question_id(), Answer::Code(editor.text().to_owned()));
        }
    }

    /// Replace the editor contents; mirrors them into the answer store.
    pub fn edit_code(&mut self, text: String, answers: &mut AnswerStore) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        answers.set(editor.question_id(), Answer::Code(text.clone()));
        editor.set_text(text);
        true
    }

    /// Change the language of the active coding question and its editor.
    ///
    /// Returns `false` (and changes nothing) for a non-coding question.
    pub fn set_language(&mut self, language: &str) -> bool {
        let Some(index) = self.active else {
            return false;
        };
        let Some(coding) = self.questions[index].as_coding_mut() else {
            return false;
        };
        coding.language = Some(language.to_owned());
        if let Some(editor) = self.editor.as_mut() {
            editor.set_language(language.to_owned());
        }
        true
    }

    /// Release the editor surface.
    pub fn dispose_editor(&mut self) {
        self.editor = None;
    }

    fn provision_editor(&mut self, answers: &AnswerStore) {
        let Some(coding) = self.active().and_then(Question::as_coding) else {
            return;
        };
        let text = answers
            .get(coding.id)
            .and_then(Answer::as_code)
            .map_or_else(|| coding.code.clone(), str::to_owned);
        let language = coding.language_or_default().to_owned();
        let id = coding.id;

        self.editors_provisioned += 1;
        self.editor = Some(CodeEditor::provision(
            id,
            self.editors_provisioned,
            text,
            language,
        ));
    }
}
