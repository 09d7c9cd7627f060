mod answer;
mod history;
mod ids;
mod question;
mod submission;
mod user;

pub use answer::Answer;
pub use history::TestSummary;
pub use ids::{ParseIdError, QuestionId, TestId, UserId};
pub use question::{
    CodingQuestion, DEFAULT_LANGUAGE, MultipleChoice, Question, QuestionKind, QuestionSetError,
    SUPPORTED_LANGUAGES, TestCase, validate_question_set,
};
pub use submission::{QuestionRecord, SubmissionRecord};
pub use user::UserRecord;
