pub mod assess_controller;
pub mod explain_controller;
pub mod file_profile_controller;
pub mod index_code_controller;
pub mod index_history_controller;
pub mod search_code_controller;
pub mod search_history_controller;

pub use assess_controller::AssessController;
pub use explain_controller::ExplainController;
pub use file_profile_controller::FileProfileController;
pub use index_code_controller::IndexCodeController;
pub use index_history_controller::IndexHistoryController;
pub use search_code_controller::SearchCodeController;
pub use search_history_controller::SearchHistoryController;
