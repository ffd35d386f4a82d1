pub mod grading_flow;
pub mod review_flow;
pub mod submission_ctx;

pub use grading_flow::GradingFlow;
pub use review_flow::ReviewFlow;
pub use submission_ctx::SubmissionCtx;
