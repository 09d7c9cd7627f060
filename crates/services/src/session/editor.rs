use assess_core::model::QuestionId;

/// The embedded code-editing surface for the active coding question.
///
/// Only one exists at a time; the navigator disposes the old surface before
/// provisioning a new one. `instance` is unique per provisioned surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEditor {
    question_id: QuestionId,
    instance: u64,
    text: String,
    language: String,
}

impl CodeEditor {
    pub(crate) fn provision(
        question_id: QuestionId,
        instance: u64,
        text: String,
        language: String,
    ) -> Self {
        Self {
            question_id,
            instance,
            text,
            language,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn instance(&self) -> u64 {
        self.instance
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn set_language(&mut self, language: String) {
        self.language = language;
    }
}
