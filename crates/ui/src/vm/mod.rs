mod assessment_vm;
mod history_vm;

pub use assessment_vm::{
    AssessmentVm, NoticeVm, OptionVm, PaletteItemVm, QuestionBodyVm, QuestionVm, map_assessment,
    status_message,
};
pub use history_vm::{HistoryRowVm, map_history_rows};
