//! # Exam Auto Grader
//!
//! 一个基于视觉 LLM 的答卷自动批改与申诉处理系统
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 数据模型层（Models）
//! - `models/` - 纯数据类型：评分标准、提交、批改结果、图片格式
//! - `DisputeStatus` - 每道题的申诉状态机（Accepted ⇄ Disputed ⇄ Resolved）
//!
//! ### ② 状态层（State）
//! - `state/` - 系统仅有的两份共享可变状态，由组合根持有并注入
//! - `RubricCatalog` - 当前评分标准（整体替换）
//! - `SubmissionRegistry` - 提交登记表（写时复制 + 总分重算）
//! - `AppState` - 状态容器 + 批改进行中标记
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单份答卷
//! - `GradingService` - 视觉 LLM 批改能力
//! - `StorageService` - 尽力而为的状态快照持久化能力
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一份提交"的完整处理流程
//! - `SubmissionCtx` - 上下文封装（submission_id + 学生姓名）
//! - `GradingFlow` - 批改流程（校验 → 调用模型 → 提交 → 持久化）
//! - `ReviewFlow` - 复核流程（申诉切换 → 仲裁 → 改分）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/` - 组合根，扫描答卷目录、管理并发、输出统计

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AnswerSheet, DisputeStatus, GradedQuestion, GradedResult, GradedStep, ImageMime, Rubric,
    RubricQuestion, Submission,
};
pub use orchestrator::App;
pub use services::{GradingService, StorageService};
pub use state::{AppState, RubricCatalog, StateSnapshot, SubmissionRegistry};
pub use workflow::{GradingFlow, ReviewFlow, SubmissionCtx};
