//! 提交登记表
//!
//! 持有全部学生提交的有序集合，是系统里唯一的共享可变集合。
//!
//! 写入纪律：所有变更都发布一个新的集合快照（写时复制），
//! 持有旧快照的一方看到的永远是一个一致的时间点视图；
//! 每条触碰单题分数的路径都在发布前重算总分，
//! 不存在能观察到"总分过期"的窗口。

use std::sync::Arc;

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::submission::{GradedQuestion, GradedResult, Submission};

/// 提交登记表
///
/// 职责：
/// - 按 ID 唯一、按插入顺序有序地保存提交
/// - 承载申诉状态机的三条变更路径（toggle / resolve / set_marks）
/// - 在每条变更路径内同步重算总分
#[derive(Debug, Default)]
pub struct SubmissionRegistry {
    submissions: Arc<Vec<Submission>>,
}

impl SubmissionRegistry {
    /// 创建空登记表
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有提交列表恢复（用于加载持久化快照）
    pub fn from_submissions(submissions: Vec<Submission>) -> Self {
        Self {
            submissions: Arc::new(submissions),
        }
    }

    /// 获取当前集合快照
    ///
    /// 快照是廉价的 Arc 克隆；之后的任何变更都不会影响它
    pub fn snapshot(&self) -> Arc<Vec<Submission>> {
        self.submissions.clone()
    }

    /// 提交数量
    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    /// 追加一个新提交
    pub fn add(&mut self, submission: Submission) {
        tracing::debug!(
            "登记提交: {} (学生: {})",
            submission.id,
            submission.student_name
        );
        Arc::make_mut(&mut self.submissions).push(submission);
    }

    /// 按 ID 查找提交
    pub fn find_by_id(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    /// 按学生姓名过滤提交
    pub fn filter_by_student(&self, student_name: &str) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| s.student_name == student_name)
            .collect()
    }

    /// 按 ID 查找提交在集合中的位置
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.submissions.iter().position(|s| s.id == id)
    }

    /// 整体替换某个提交的批改结果
    ///
    /// 这是重新批改的提交路径：旧结果（连同其中未了结的申诉）
    /// 全部丢弃。总分在提交前重算，不信任外部传入的合计值。
    pub fn replace_result(&mut self, id: &str, mut result: GradedResult) -> AppResult<()> {
        result.recompute_total();

        let index = self
            .index_of(id)
            .ok_or_else(|| AppError::submission_not_found(id))?;

        let submissions = Arc::make_mut(&mut self.submissions);
        submissions[index].graded_result = Some(result);
        Ok(())
    }

    /// 切换某道题的申诉状态（学生和老师走同一条路径）
    pub fn toggle_dispute(&mut self, id: &str, question_index: usize) -> AppResult<()> {
        self.with_question(id, question_index, |q| {
            q.toggle_dispute();
            Ok(())
        })
    }

    /// 正式仲裁某道题：改分 + Resolved + 仲裁意见
    pub fn resolve_dispute(
        &mut self,
        id: &str,
        question_index: usize,
        new_marks: f64,
        comment: &str,
    ) -> AppResult<()> {
        // Resolved 必须携带非空意见
        if comment.trim().is_empty() {
            return Err(AppError::Validation(ValidationError::EmptyResolutionComment));
        }

        self.with_question(id, question_index, |q| {
            q.resolve(new_marks, comment.to_string());
            Ok(())
        })
    }

    /// 日常改分：不触碰申诉状态
    pub fn set_marks(&mut self, id: &str, question_index: usize, new_marks: f64) -> AppResult<()> {
        self.with_question(id, question_index, |q| {
            q.set_marks(new_marks);
            Ok(())
        })
    }

    /// 对单道题执行变更，并在发布新快照前重算总分
    ///
    /// 所有单题变更路径都收拢到这里，保证总分不变式对每条路径成立
    fn with_question(
        &mut self,
        id: &str,
        question_index: usize,
        mutate: impl FnOnce(&mut GradedQuestion) -> AppResult<()>,
    ) -> AppResult<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| AppError::submission_not_found(id))?;

        // 校验全部通过之前不做任何实际变更，拒绝即无副作用
        let submissions = Arc::make_mut(&mut self.submissions);
        let result = submissions[index].graded_result.as_mut().ok_or_else(|| {
            AppError::Validation(ValidationError::NotGraded { id: id.to_string() })
        })?;
        if question_index >= result.questions.len() {
            return Err(AppError::Validation(
                ValidationError::QuestionIndexOutOfRange {
                    index: question_index,
                    count: result.questions.len(),
                },
            ));
        }

        mutate(&mut result.questions[question_index])?;
        result.recompute_total();
        Ok(())
    }
}
