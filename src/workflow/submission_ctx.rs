//! 提交处理上下文
//!
//! 封装"我正在批改哪个学生的哪份提交"这一信息

use std::fmt::Display;

/// 提交处理上下文
///
/// 包含处理单份提交所需的全部上下文信息
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 提交ID
    pub submission_id: String,

    /// 提交序号（仅用于日志显示，从1开始）
    pub display_index: usize,

    /// 学生姓名
    pub student_name: String,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(submission_id: String, display_index: usize, student_name: String) -> Self {
        Self {
            submission_id,
            display_index,
            student_name,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[提交 ID#{} 学生#{}]",
            self.submission_id, self.student_name
        )
    }
}
