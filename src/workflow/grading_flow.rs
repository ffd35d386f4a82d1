//! 批改流程 - 流程层
//!
//! 核心职责：定义"一份提交"的完整批改流程
//!
//! 流程顺序：
//! 1. 持锁校验并登记进行中标记（begin_grading）
//! 2. 锁外调用批改服务（唯一的挂起点）
//! 3. 持锁提交结果并清除标记（finish_grading / abort_grading）
//! 4. 持久化新快照（尽力而为）

use std::sync::Arc;

use tracing::{error, info};

use crate::error::AppResult;
use crate::services::{GradingService, StorageService};
use crate::state::app_state::SharedState;
use crate::workflow::submission_ctx::SubmissionCtx;

/// 批改流程
///
/// - 编排单份提交的完整批改流程
/// - 不持有应用状态，状态通过参数注入
/// - 只依赖业务能力（services）
pub struct GradingFlow {
    grading_service: GradingService,
    storage_service: Arc<StorageService>,
}

impl GradingFlow {
    /// 创建新的批改流程
    pub fn new(grading_service: GradingService, storage_service: Arc<StorageService>) -> Self {
        Self {
            grading_service,
            storage_service,
        }
    }

    /// 批改一份提交
    ///
    /// 失败时目标提交的旧批改结果原样保留（不会半写）；
    /// 成功时整体替换旧结果并持久化新快照。
    pub async fn run(&self, state: &SharedState, ctx: &SubmissionCtx) -> AppResult<()> {
        // 持锁校验：评分标准、提交存在性、进行中标记。
        // 校验失败在这里同步拒绝，批改服务不会被调用。
        let job = {
            let mut state = state.lock().await;
            state.begin_grading(&ctx.submission_id)?
        };

        info!(
            "[提交 {}] 📝 开始批改 (学生: {}, 标准: {})",
            ctx.display_index, ctx.student_name, job.rubric.exam_name
        );

        // 锁外调用批改服务，不阻塞其他提交的状态操作
        match self.grading_service.grade(&job.sheet, &job.rubric).await {
            Ok(result) => {
                info!(
                    "[提交 {}] ✓ 批改完成: {}/{} 分 (共 {} 题)",
                    ctx.display_index,
                    result.total_marks_awarded,
                    result.total_max_marks,
                    result.questions.len()
                );

                let snapshot = {
                    let mut state = state.lock().await;
                    state.finish_grading(&ctx.submission_id, result)?;
                    state.to_snapshot()
                };

                // 持久化失败只记日志，不影响已提交的内存状态
                self.storage_service.save(&snapshot).await;
                Ok(())
            }
            Err(e) => {
                error!("[提交 {}] ❌ 批改失败: {}", ctx.display_index, e);

                let mut state = state.lock().await;
                state.abort_grading(&ctx.submission_id);
                Err(e)
            }
        }
    }
}
