pub mod loaders;
pub mod mime;
pub mod rubric;
pub mod submission;

pub use loaders::{load_rubric_from_toml, try_load_rubric};
pub use mime::ImageMime;
pub use rubric::{GradingKeyword, GradingStep, Rubric, RubricQuestion};
pub use submission::{
    AnswerSheet, DisputeStatus, GradedQuestion, GradedResult, GradedStep, Submission,
};
