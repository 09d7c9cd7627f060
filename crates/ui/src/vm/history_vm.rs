use assess_core::model::{TestId, TestSummary};

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRowVm {
    pub id: TestId,
    pub title: String,
    pub date: String,
    pub questions_label: String,
    pub duration_label: String,
    pub score_label: String,
    pub bookmarked: bool,
    pub summary: TestSummary,
}

#[must_use]
pub fn map_history_rows(tests: &[TestSummary]) -> Vec<HistoryRowVm> {
    tests.iter().map(map_history_row).collect()
}

fn map_history_row(test: &TestSummary) -> HistoryRowVm {
    let title = if test.title.trim().is_empty() {
        "Untitled test".to_owned()
    } else {
        test.title.clone()
    };
    HistoryRowVm {
        id: test.id.clone(),
        title,
        date: test.date.clone(),
        questions_label: format!("{} questions", test.num_questions),
        duration_label: format!("{} min", test.duration),
        score_label: format!("{:.0}%", test.score),
        bookmarked: test.bookmarked,
        summary: test.clone(),
    }
}
