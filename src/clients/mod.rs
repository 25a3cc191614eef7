pub mod http_store;
pub mod store;

pub use http_store::HttpQuestionStore;
pub use store::{BulkUpdateResult, CreateFinalResult, QuestionStore};
