pub mod final_question;
pub mod question;
pub mod summary;

pub use final_question::{FinalAnswer, FinalQuestion};
pub use question::{Answer, Question, QuestionType};
pub use summary::RunSummary;
