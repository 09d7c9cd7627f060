use serde::{Deserialize, Serialize};

use crate::model::TestId;

/// One past attempt as listed by the history and bookmark endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub id: TestId,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub num_questions: u32,
    /// Minutes for history rows.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub bookmarked: bool,
}
