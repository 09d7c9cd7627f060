use serde::{Deserialize, Serialize};

/// A learner's current answer to one question. Absence means unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Index into a multiple-choice question's options.
    Option(usize),
    /// Editor contents for a coding question.
    Code(String),
}

impl Answer {
    #[must_use]
    pub fn as_option(&self) -> Option<usize> {
        match self {
            Answer::Option(index) => Some(*index),
            Answer::Code(_) => None,
        }
    }

    #[must_use]
    pub fn as_code(&self) -> Option<&str> {
        match self {
            Answer::Code(code) => Some(code),
            Answer::Option(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert_eq!(Answer::Option(2).as_option(), Some(2));
        assert_eq!(Answer::Option(2).as_code(), None);
        assert_eq!(Answer::Code("x".into()).as_code(), Some("x"));
        assert_eq!(Answer::Code("x".into()).as_option(), None);
    }
}
