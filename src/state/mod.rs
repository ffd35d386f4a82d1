//! 应用状态层
//!
//! - `catalog` - 评分标准目录（整体替换）
//! - `registry` - 提交登记表（写时复制 + 申诉状态机 + 总分重算）
//! - `app_state` - 状态容器与批改进行中标记

pub mod app_state;
pub mod catalog;
pub mod registry;

pub use app_state::{AppState, GradingJob, StateSnapshot};
pub use catalog::RubricCatalog;
pub use registry::SubmissionRegistry;
