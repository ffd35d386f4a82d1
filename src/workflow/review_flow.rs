//! 复核流程 - 流程层
//!
//! 承载批改之后的三条变更路径：申诉切换、正式仲裁、日常改分。
//! 每条路径都是"持锁同步变更（登记表内部重算总分）→ 持久化快照"，
//! 系统不区分是学生还是老师在调用。

use std::sync::Arc;

use tracing::info;

use crate::error::AppResult;
use crate::services::StorageService;
use crate::state::app_state::SharedState;

/// 复核流程
pub struct ReviewFlow {
    storage_service: Arc<StorageService>,
}

impl ReviewFlow {
    /// 创建新的复核流程
    pub fn new(storage_service: Arc<StorageService>) -> Self {
        Self { storage_service }
    }

    /// 切换某道题的申诉状态
    pub async fn toggle_dispute(
        &self,
        state: &SharedState,
        submission_id: &str,
        question_index: usize,
    ) -> AppResult<()> {
        let snapshot = {
            let mut state = state.lock().await;
            state.registry.toggle_dispute(submission_id, question_index)?;
            state.to_snapshot()
        };

        info!("提交 {} 第 {} 题申诉状态已切换", submission_id, question_index + 1);
        self.storage_service.save(&snapshot).await;
        Ok(())
    }

    /// 正式仲裁某道题
    pub async fn resolve_dispute(
        &self,
        state: &SharedState,
        submission_id: &str,
        question_index: usize,
        new_marks: f64,
        comment: &str,
    ) -> AppResult<()> {
        let snapshot = {
            let mut state = state.lock().await;
            state
                .registry
                .resolve_dispute(submission_id, question_index, new_marks, comment)?;
            state.to_snapshot()
        };

        info!(
            "提交 {} 第 {} 题已仲裁: {} 分",
            submission_id,
            question_index + 1,
            new_marks
        );
        self.storage_service.save(&snapshot).await;
        Ok(())
    }

    /// 日常改分（不经过申诉流程）
    pub async fn set_marks(
        &self,
        state: &SharedState,
        submission_id: &str,
        question_index: usize,
        new_marks: f64,
    ) -> AppResult<()> {
        let snapshot = {
            let mut state = state.lock().await;
            state
                .registry
                .set_marks(submission_id, question_index, new_marks)?;
            state.to_snapshot()
        };

        info!(
            "提交 {} 第 {} 题分数已修改为 {}",
            submission_id,
            question_index + 1,
            new_marks
        );
        self.storage_service.save(&snapshot).await;
        Ok(())
    }
}
