mod components;
mod scripts;
mod view;

pub use components::{AssessmentScreen, NoticeList};
pub use view::AssessmentView;
