//! 状态持久化服务 - 业务能力层
//!
//! 把内存中的应用状态整体快照写入 JSON 文件，启动时读回。
//!
//! 尽力而为：读写失败只记日志，绝不向调用方抛错，
//! 也绝不破坏内存状态。

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::state::app_state::StateSnapshot;

/// 状态持久化服务
///
/// 职责：
/// - save：每次已提交的状态变更之后整体写入快照
/// - load：启动时读回快照
/// - 失败吞掉并记 warn，不影响主流程
pub struct StorageService {
    storage_path: PathBuf,
}

impl StorageService {
    /// 创建新的持久化服务
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    /// 保存状态快照（尽力而为，失败只记日志）
    pub async fn save(&self, snapshot: &StateSnapshot) {
        match self.try_save(snapshot).await {
            Ok(()) => debug!(
                "状态快照已保存: {} ({} 个提交)",
                self.storage_path.display(),
                snapshot.submissions.len()
            ),
            Err(e) => warn!("保存状态快照失败（忽略）: {}", e),
        }
    }

    /// 加载状态快照（尽力而为，失败或不存在时返回 None）
    pub async fn load(&self) -> Option<StateSnapshot> {
        if !self.storage_path.exists() {
            debug!("状态快照文件不存在: {}", self.storage_path.display());
            return None;
        }

        match self.try_load().await {
            Ok(snapshot) => {
                debug!(
                    "状态快照已加载: {} ({} 个提交)",
                    self.storage_path.display(),
                    snapshot.submissions.len()
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!("加载状态快照失败（忽略，按空状态启动）: {}", e);
                None
            }
        }
    }

    async fn try_save(&self, snapshot: &StateSnapshot) -> AppResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.storage_path, json).await.map_err(|e| {
            AppError::file_write_failed(self.storage_path.display().to_string(), e)
        })?;
        Ok(())
    }

    async fn try_load(&self) -> AppResult<StateSnapshot> {
        let content = fs::read_to_string(&self.storage_path).await?;
        let snapshot: StateSnapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mime::ImageMime;
    use crate::models::submission::{AnswerSheet, Submission};

    fn temp_storage(name: &str) -> StorageService {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "exam_auto_grader_test_{}_{}.json",
            name,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        StorageService::new(path)
    }

    fn snapshot_with_one_submission() -> StateSnapshot {
        StateSnapshot {
            rubric: None,
            submissions: vec![Submission {
                id: "sub-1".to_string(),
                student_name: "张三".to_string(),
                submission_date: "2026-08-29T10:00:00+08:00".to_string(),
                answer_sheet: AnswerSheet {
                    source_path: Some("answer_sheets/张三.png".to_string()),
                    mime: ImageMime::Png,
                    data_base64: "aGVsbG8=".to_string(),
                },
                graded_result: None,
            }],
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        tokio_test::block_on(async {
            let storage = temp_storage("round_trip");
            storage.save(&snapshot_with_one_submission()).await;

            let loaded = storage.load().await.expect("应能读回快照");
            assert_eq!(loaded.submissions.len(), 1);
            assert_eq!(loaded.submissions[0].student_name, "张三");

            let _ = std::fs::remove_file(&storage.storage_path);
        });
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let storage = temp_storage("missing");
        assert!(storage.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_swallowed() {
        let storage = temp_storage("corrupt");
        tokio::fs::write(&storage.storage_path, "不是 JSON{{{")
            .await
            .unwrap();

        // 解析失败不向外抛错，按空状态处理
        assert!(storage.load().await.is_none());

        let _ = std::fs::remove_file(&storage.storage_path);
    }

    #[tokio::test]
    async fn test_save_to_bad_path_is_swallowed() {
        let storage = StorageService::new("/不存在的目录/深层/state.json");
        // 不 panic、不抛错即可
        storage.save(&snapshot_with_one_submission()).await;
    }
}
