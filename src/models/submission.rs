//! 学生提交与批改结果数据模型
//!
//! 核心是每道题的申诉状态机：
//!
//! ```text
//! Accepted ⇄ Disputed ⇄ Resolved(comment)
//! ```
//!
//! - 进入 Disputed 时任何旧的仲裁意见都会被丢弃
//! - 通过 toggle 离开 Disputed 落在 Accepted（直接撤销路径）
//! - 只有 resolve 会同时修改分数和申诉状态
//! - 没有终态，可以无限循环

use serde::{Deserialize, Serialize};

use crate::models::mime::ImageMime;

/// 单道题的申诉状态
///
/// 仲裁意见直接挂在 Resolved 变体上，
/// "非 Resolved 却残留意见"这种非法组合在类型上不可表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum DisputeStatus {
    /// 学生接受批改结果（初始状态，由批改服务统一设置）
    Accepted,
    /// 学生或老师对该题提出申诉
    Disputed,
    /// 老师正式仲裁完毕，附带仲裁意见
    Resolved {
        /// 仲裁意见（非空）
        comment: String,
    },
}

impl DisputeStatus {
    /// 当前是否处于申诉中
    pub fn is_disputed(&self) -> bool {
        matches!(self, DisputeStatus::Disputed)
    }

    /// 获取仲裁意见（仅 Resolved 状态存在）
    pub fn resolution_comment(&self) -> Option<&str> {
        match self {
            DisputeStatus::Resolved { comment } => Some(comment),
            _ => None,
        }
    }
}

impl Default for DisputeStatus {
    fn default() -> Self {
        DisputeStatus::Accepted
    }
}

/// 批改结果中的单个得分步骤
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedStep {
    /// 步骤序号
    pub step_index: u32,
    /// 步骤描述
    pub description: String,
    /// 该步骤是否正确
    pub correct: bool,
    /// 该步骤得分
    pub marks_awarded: f64,
}

/// 单道题的批改结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedQuestion {
    /// 题号（与评分标准按值软关联，允许找不到对应题目）
    pub question_number: String,
    /// 该题得分
    pub marks_awarded: f64,
    /// 该题满分（批改时定格，之后替换评分标准不会回写）
    pub max_marks: f64,
    /// 批改反馈
    pub feedback: String,
    /// 步骤得分明细
    #[serde(default)]
    pub steps: Vec<GradedStep>,
    /// 识别到的关键词
    #[serde(default)]
    pub keywords_found: Vec<String>,
    /// 需要改进的方面
    #[serde(default)]
    pub area_for_improvement: String,
    /// 申诉状态
    #[serde(default)]
    pub dispute_status: DisputeStatus,
}

impl GradedQuestion {
    /// 将分数收拢到 [0, max_marks] 区间
    fn clamp_marks(&self, marks: f64) -> f64 {
        let upper = if self.max_marks > 0.0 {
            self.max_marks
        } else {
            0.0
        };
        marks.max(0.0).min(upper)
    }

    /// 在"申诉中/非申诉中"两侧之间切换
    ///
    /// - 从任何状态进入 Disputed 都会丢弃旧的仲裁意见
    /// - 从 Disputed 切出时落在 Accepted（直接撤销，不走仲裁）
    pub fn toggle_dispute(&mut self) {
        self.dispute_status = if self.dispute_status.is_disputed() {
            DisputeStatus::Accepted
        } else {
            DisputeStatus::Disputed
        };
    }

    /// 正式仲裁：改分 + 置为 Resolved + 记录仲裁意见
    ///
    /// 概念上只应在 Disputed 状态调用，但不做强制，
    /// 任何状态下调用结果一致
    pub fn resolve(&mut self, new_marks: f64, comment: String) {
        self.marks_awarded = self.clamp_marks(new_marks);
        self.dispute_status = DisputeStatus::Resolved { comment };
    }

    /// 日常改分：不经过申诉流程，不触碰申诉状态
    pub fn set_marks(&mut self, new_marks: f64) {
        self.marks_awarded = self.clamp_marks(new_marks);
    }
}

/// 一份答卷的完整批改结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedResult {
    /// 实际得分合计（永远由各题得分重新推导，不单独手填）
    pub total_marks_awarded: f64,
    /// 满分合计
    pub total_max_marks: f64,
    /// 各题批改结果（有序）
    pub questions: Vec<GradedQuestion>,
}

impl GradedResult {
    /// 重算总分：total_marks_awarded = Σ marks_awarded
    ///
    /// 每条触碰单题分数的变更路径都必须在提交前调用
    pub fn recompute_total(&mut self) {
        self.total_marks_awarded = self.questions.iter().map(|q| q.marks_awarded).sum();
    }
}

/// 答卷图片数据
///
/// 核心只接触编码后的字节和 MIME 类型，不接触原始文件句柄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSheet {
    /// 来源文件路径（仅用于日志显示）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// 图片 MIME 类型
    pub mime: ImageMime,
    /// base64 编码的图片数据
    pub data_base64: String,
}

impl AnswerSheet {
    /// 构建 data URL，供 Vision API 使用
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime.as_str(), self.data_base64)
    }
}

/// 一次学生提交
///
/// 同一个学生可以有多次提交；注册时 `graded_result` 为空，
/// 每次批改调用整体替换批改结果（连同其中的申诉状态）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// 提交ID（全局唯一）
    pub id: String,
    /// 学生姓名
    pub student_name: String,
    /// 提交时间（RFC3339）
    pub submission_date: String,
    /// 答卷图片
    pub answer_sheet: AnswerSheet,
    /// 批改结果（未批改时为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_result: Option<GradedResult>,
}

impl Submission {
    /// 是否已批改
    pub fn is_graded(&self) -> bool {
        self.graded_result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(marks: f64, max: f64) -> GradedQuestion {
        GradedQuestion {
            question_number: "Q1".to_string(),
            marks_awarded: marks,
            max_marks: max,
            feedback: "还不错".to_string(),
            steps: vec![],
            keywords_found: vec![],
            area_for_improvement: String::new(),
            dispute_status: DisputeStatus::Accepted,
        }
    }

    #[test]
    fn test_toggle_enters_and_leaves_dispute() {
        let mut q = question(8.0, 10.0);
        q.toggle_dispute();
        assert_eq!(q.dispute_status, DisputeStatus::Disputed);
        q.toggle_dispute();
        assert_eq!(q.dispute_status, DisputeStatus::Accepted);
    }

    #[test]
    fn test_toggle_from_resolved_drops_comment() {
        let mut q = question(8.0, 10.0);
        q.resolve(9.0, "部分步骤给分".to_string());
        assert_eq!(q.dispute_status.resolution_comment(), Some("部分步骤给分"));

        // 进入 Disputed 丢弃仲裁意见
        q.toggle_dispute();
        assert_eq!(q.dispute_status, DisputeStatus::Disputed);
        assert!(q.dispute_status.resolution_comment().is_none());

        // 再切一次不会恢复意见：落在 Accepted
        q.toggle_dispute();
        assert_eq!(q.dispute_status, DisputeStatus::Accepted);
        assert!(q.dispute_status.resolution_comment().is_none());
    }

    #[test]
    fn test_resolve_from_any_state() {
        let mut q = question(8.0, 10.0);
        // 未申诉也允许直接仲裁
        q.resolve(9.0, "方法分".to_string());
        assert_eq!(q.marks_awarded, 9.0);
        assert!(matches!(q.dispute_status, DisputeStatus::Resolved { .. }));
    }

    #[test]
    fn test_marks_clamped_to_range() {
        let mut q = question(8.0, 10.0);
        q.set_marks(12.5);
        assert_eq!(q.marks_awarded, 10.0);
        q.set_marks(-3.0);
        assert_eq!(q.marks_awarded, 0.0);
        q.resolve(99.0, "笔误".to_string());
        assert_eq!(q.marks_awarded, 10.0);
    }

    #[test]
    fn test_set_marks_keeps_dispute_state() {
        let mut q = question(8.0, 10.0);
        q.toggle_dispute();
        q.set_marks(10.0);
        assert_eq!(q.dispute_status, DisputeStatus::Disputed);
    }

    #[test]
    fn test_recompute_total() {
        let mut result = GradedResult {
            total_marks_awarded: 0.0,
            total_max_marks: 20.0,
            questions: vec![question(8.0, 10.0), question(8.0, 10.0)],
        };
        result.recompute_total();
        assert_eq!(result.total_marks_awarded, 16.0);

        result.questions[1].set_marks(10.0);
        result.recompute_total();
        assert_eq!(result.total_marks_awarded, 18.0);
    }

    #[test]
    fn test_dispute_status_serde_shape() {
        let resolved = DisputeStatus::Resolved {
            comment: "酌情给分".to_string(),
        };
        let json = serde_json::to_string(&resolved).unwrap();
        let back: DisputeStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resolution_comment(), Some("酌情给分"));
    }
}
