pub mod eligibility_service;
pub mod ranking_service;
pub mod reconcile_service;

pub use eligibility_service::{Eligibility, EligibilityService, EligibilitySummary};
pub use ranking_service::{AnswerRanker, BatchOutcome, ProcessOutcome, QuestionProcessor, RankingService};
pub use reconcile_service::{Categorized, ReconcileService};
