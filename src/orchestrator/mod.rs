//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是系统的组合根：唯一持有共享状态和各个流程对象的地方，
//! 负责启动恢复、批量调度和统计输出，不做具体业务判断。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (组合根，持有 SharedState)
//!     ↓
//! workflow::GradingFlow / ReviewFlow (单份提交的流程编排)
//!     ↓
//! services (能力层：grading / storage)
//!     ↓
//! state (状态层：catalog / registry / app_state)
//!     ↓
//! models (数据模型)
//! ```

pub mod app;

pub use app::{App, ProcessingStats};
