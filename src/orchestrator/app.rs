//! 应用组合根与批量批改编排
//!
//! 唯一持有共享状态和各个流程对象的地方：
//! 加载持久化快照和评分标准，扫描答卷目录登记提交，
//! 以受控并发批量批改，输出统计。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::loaders::try_load_rubric;
use crate::models::mime::ImageMime;
use crate::models::submission::{AnswerSheet, Submission};
use crate::services::{GradingService, StorageService};
use crate::state::app_state::{AppState, SharedState};
use crate::workflow::{GradingFlow, ReviewFlow, SubmissionCtx};

/// 应用主结构
pub struct App {
    config: Config,
    state: SharedState,
    grading_flow: Arc<GradingFlow>,
    review_flow: ReviewFlow,
    storage_service: Arc<StorageService>,
}

impl App {
    /// 初始化应用
    ///
    /// 顺序：恢复持久化快照 → 加载评分标准 → 构建批改服务
    /// （凭证缺失在这里立即失败，不发起任何网络请求）
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let storage_service = Arc::new(StorageService::new(&config.storage_file));

        // 恢复上次的状态快照（失败按空状态启动）
        let mut state = match storage_service.load().await {
            Some(snapshot) => {
                info!(
                    "✓ 已恢复状态快照: {} 个提交",
                    snapshot.submissions.len()
                );
                AppState::from_snapshot(snapshot)
            }
            None => AppState::new(),
        };

        // 加载评分标准文件（整体替换快照中的旧标准）
        if let Some(rubric) = try_load_rubric(Path::new(&config.rubric_file)).await? {
            state.catalog.set_rubric(rubric);
        }

        let grading_service = GradingService::new(&config)?;
        let grading_flow = Arc::new(GradingFlow::new(
            grading_service,
            storage_service.clone(),
        ));
        let review_flow = ReviewFlow::new(storage_service.clone());

        Ok(Self {
            config,
            state: Arc::new(Mutex::new(state)),
            grading_flow,
            review_flow,
            storage_service,
        })
    }

    /// 运行应用主逻辑：登记新答卷 → 批量批改 → 输出统计
    pub async fn run(&self) -> Result<()> {
        // 扫描答卷目录，登记新提交
        let registered = self.register_intake().await?;
        if registered > 0 {
            let snapshot = self.state.lock().await.to_snapshot();
            self.storage_service.save(&snapshot).await;
        }

        // 收集所有未批改的提交
        let pending = self.pending_submissions().await;
        if pending.is_empty() {
            warn!("⚠️ 没有待批改的提交，程序结束");
            return Ok(());
        }

        log_pending(pending.len(), self.config.max_concurrent_gradings);

        let stats = self.grade_all(pending).await;
        print_final_stats(&stats);

        Ok(())
    }

    /// 复核流程（申诉切换、仲裁、改分）
    pub fn review_flow(&self) -> &ReviewFlow {
        &self.review_flow
    }

    /// 共享状态（供复核流程等调用方使用）
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// 扫描答卷目录并登记新提交
    ///
    /// 文件名主干作为学生姓名，扩展名决定 MIME 类型；
    /// 已登记过的文件（按来源路径判断）跳过
    async fn register_intake(&self) -> Result<usize> {
        let folder = PathBuf::from(&self.config.intake_folder);
        if !folder.exists() {
            warn!("答卷目录不存在: {}，跳过登记", folder.display());
            return Ok(0);
        }

        info!("\n📁 正在扫描答卷目录: {}", folder.display());

        let mut registered = 0usize;
        let mut entries = tokio::fs::read_dir(&folder).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(mime) = ImageMime::from_path(&path) else {
                continue;
            };
            let source_path = path.to_string_lossy().to_string();

            let mut state = self.state.lock().await;
            let already_registered = state
                .registry
                .snapshot()
                .iter()
                .any(|s| s.answer_sheet.source_path.as_deref() == Some(source_path.as_str()));
            if already_registered {
                continue;
            }
            drop(state);

            // 核心只接触编码后的字节和 MIME 类型
            let bytes = tokio::fs::read(&path).await?;
            let data_base64 = BASE64.encode(&bytes);

            let student_name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "未知学生".to_string());

            let submission = Submission {
                id: format!(
                    "sub-{}-{}",
                    chrono::Utc::now().timestamp_millis(),
                    registered
                ),
                student_name: student_name.clone(),
                submission_date: chrono::Local::now().to_rfc3339(),
                answer_sheet: AnswerSheet {
                    source_path: Some(source_path),
                    mime,
                    data_base64,
                },
                graded_result: None,
            };

            info!("✓ 登记答卷: {} ({})", student_name, mime);
            self.state.lock().await.register_submission(submission);
            registered += 1;
        }

        info!("共登记 {} 份新答卷", registered);
        Ok(registered)
    }

    /// 收集所有未批改的提交上下文
    async fn pending_submissions(&self) -> Vec<SubmissionCtx> {
        let state = self.state.lock().await;
        state
            .registry
            .snapshot()
            .iter()
            .filter(|s| !s.is_graded())
            .enumerate()
            .map(|(i, s)| SubmissionCtx::new(s.id.clone(), i + 1, s.student_name.clone()))
            .collect()
    }

    /// 以受控并发批改全部待批提交
    async fn grade_all(&self, pending: Vec<SubmissionCtx>) -> ProcessingStats {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_gradings));
        let mut stats = ProcessingStats {
            total: pending.len(),
            ..Default::default()
        };

        let mut handles = Vec::new();
        for ctx in pending {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let flow = self.grading_flow.clone();
            let state = self.state.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                flow.run(&state, &ctx).await
            });
            handles.push(handle);
        }

        for outcome in join_all(handles).await {
            match outcome {
                Ok(Ok(())) => stats.success += 1,
                Ok(Err(_)) => stats.failed += 1,
                Err(e) => {
                    error!("批改任务执行失败: {}", e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}

/// 处理统计
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 答卷批改模式");
    info!("📊 最大并发批改数: {}", config.max_concurrent_gradings);
    info!("🤖 批改模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

fn log_pending(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份待批改的提交", total);
    info!("📋 将以最多 {} 个并发进行批改\n", max_concurrent);
}

fn print_final_stats(stats: &ProcessingStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部批改完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
}
