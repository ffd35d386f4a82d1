//! 评分标准目录
//!
//! 持有当前唯一生效的评分标准，整体替换、整体读取

use std::sync::Arc;

use crate::models::rubric::{Rubric, RubricQuestion};

/// 评分标准目录
///
/// 职责：
/// - 保存老师设置的当前评分标准
/// - 整体替换，不与旧标准合并
/// - 替换不会回写已批改提交中定格的满分值
#[derive(Debug, Default)]
pub struct RubricCatalog {
    rubric: Option<Arc<Rubric>>,
}

impl RubricCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 无条件整体替换当前评分标准
    pub fn set_rubric(&mut self, rubric: Rubric) {
        tracing::info!(
            "设置评分标准: {} (共 {} 题)",
            rubric.exam_name,
            rubric.questions.len()
        );
        self.rubric = Some(Arc::new(rubric));
    }

    /// 获取当前评分标准（未设置时为 None）
    pub fn rubric(&self) -> Option<Arc<Rubric>> {
        self.rubric.clone()
    }

    /// 是否已设置评分标准
    pub fn is_set(&self) -> bool {
        self.rubric.is_some()
    }

    /// 按题号查找标准题目
    ///
    /// 批改结果与评分标准按题号软关联，找不到时返回 None
    pub fn question(&self, question_number: &str) -> Option<&RubricQuestion> {
        self.rubric
            .as_deref()
            .and_then(|r| r.question(question_number))
    }
}
