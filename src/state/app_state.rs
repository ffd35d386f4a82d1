//! 应用状态容器
//!
//! 评分标准目录和提交登记表是系统仅有的两份共享可变状态，
//! 统一收拢在这里，由组合根持有并注入，不使用任何全局变量。
//!
//! 并发模型：外层用 `Arc<tokio::sync::Mutex<AppState>>` 包裹，
//! 所有状态变更都在持锁期间同步完成、不挂起；
//! 唯一会挂起的批改调用在锁外进行，
//! 通过 `begin_grading` / `finish_grading` / `abort_grading`
//! 的进行中标记保证同一提交同时只有一次批改调用。

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::rubric::Rubric;
use crate::models::submission::{AnswerSheet, GradedResult, Submission};
use crate::state::catalog::RubricCatalog;
use crate::state::registry::SubmissionRegistry;

/// 共享应用状态：组合根持有并注入，不使用全局变量
pub type SharedState = Arc<tokio::sync::Mutex<AppState>>;

/// 持久化快照：评分标准 + 全部提交
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// 当前评分标准
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric: Option<Rubric>,
    /// 全部提交
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// 一次批改调用所需的全部输入
///
/// 由 `begin_grading` 在持锁期间克隆好，批改调用本身不再接触状态
#[derive(Debug, Clone)]
pub struct GradingJob {
    /// 目标提交 ID
    pub submission_id: String,
    /// 答卷图片
    pub sheet: AnswerSheet,
    /// 批改所依据的评分标准
    pub rubric: Arc<Rubric>,
}

/// 应用状态
#[derive(Debug, Default)]
pub struct AppState {
    /// 评分标准目录
    pub catalog: RubricCatalog,
    /// 提交登记表
    pub registry: SubmissionRegistry,
    /// 批改进行中的提交 ID 集合（不持久化）
    in_flight: HashSet<String>,
}

impl AppState {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 从持久化快照恢复
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let mut catalog = RubricCatalog::new();
        if let Some(rubric) = snapshot.rubric {
            catalog.set_rubric(rubric);
        }
        Self {
            catalog,
            registry: SubmissionRegistry::from_submissions(snapshot.submissions),
            in_flight: HashSet::new(),
        }
    }

    /// 导出持久化快照
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            rubric: self.catalog.rubric().map(|r| (*r).clone()),
            submissions: self.registry.snapshot().to_vec(),
        }
    }

    /// 开始一次批改调用
    ///
    /// 持锁期间完成全部前置校验并登记进行中标记：
    /// - 未设置评分标准 → 拒绝，不调用批改服务、不变更登记表
    /// - 提交不存在 → 拒绝
    /// - 该提交已有批改在进行中 → 拒绝（关闭同一提交的丢失更新竞争）
    ///
    /// 成功时返回克隆好的批改输入，调用方在锁外发起批改
    pub fn begin_grading(&mut self, id: &str) -> AppResult<GradingJob> {
        let rubric = self
            .catalog
            .rubric()
            .ok_or(AppError::Validation(ValidationError::RubricNotSet))?;

        let submission = self
            .registry
            .find_by_id(id)
            .ok_or_else(|| AppError::submission_not_found(id))?;

        if self.in_flight.contains(id) {
            return Err(AppError::Validation(ValidationError::GradingInFlight {
                id: id.to_string(),
            }));
        }

        let job = GradingJob {
            submission_id: id.to_string(),
            sheet: submission.answer_sheet.clone(),
            rubric,
        };

        self.in_flight.insert(id.to_string());
        Ok(job)
    }

    /// 批改成功：清除进行中标记并整体替换批改结果
    pub fn finish_grading(&mut self, id: &str, result: GradedResult) -> AppResult<()> {
        self.in_flight.remove(id);
        self.registry.replace_result(id, result)
    }

    /// 批改失败：只清除进行中标记，批改结果保持原样
    pub fn abort_grading(&mut self, id: &str) {
        self.in_flight.remove(id);
    }

    /// 某个提交是否有批改调用在进行中
    pub fn is_grading(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// 登记一个新提交
    pub fn register_submission(&mut self, submission: Submission) {
        self.registry.add(submission);
    }
}
