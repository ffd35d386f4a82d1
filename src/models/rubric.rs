//! 评分标准数据模型
//!
//! 评分标准由老师整体设置、整体替换，不做局部修改

use serde::{Deserialize, Serialize};

/// 单个得分步骤（按步骤给分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingStep {
    /// 步骤描述
    pub description: String,
    /// 该步骤分值
    pub marks: f64,
}

/// 关键词得分项（按关键词给分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingKeyword {
    /// 关键词
    pub keyword: String,
    /// 该关键词分值
    pub marks: f64,
}

/// 评分标准中的单个题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricQuestion {
    /// 题号（在一份评分标准内唯一）
    pub question_number: String,
    /// 该题满分
    pub max_marks: f64,
    /// 参考答案
    pub expected_answer: String,
    /// 得分步骤列表
    #[serde(default)]
    pub steps: Vec<GradingStep>,
    /// 关键词列表
    #[serde(default)]
    pub keywords: Vec<GradingKeyword>,
}

/// 一份完整的评分标准
///
/// 注意：不校验各题分值之和是否等于 `total_marks`，
/// 下游必须容忍两者不一致
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    /// 考试名称
    pub exam_name: String,
    /// 试卷总分
    pub total_marks: f64,
    /// 题目列表（有序）
    #[serde(default)]
    pub questions: Vec<RubricQuestion>,
}

impl Rubric {
    /// 按题号查找题目（软关联：找不到时返回 None）
    pub fn question(&self, question_number: &str) -> Option<&RubricQuestion> {
        self.questions
            .iter()
            .find(|q| q.question_number == question_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rubric() -> Rubric {
        Rubric {
            exam_name: "期中数学".to_string(),
            total_marks: 20.0,
            questions: vec![
                RubricQuestion {
                    question_number: "Q1".to_string(),
                    max_marks: 10.0,
                    expected_answer: "x = 2".to_string(),
                    steps: vec![GradingStep {
                        description: "移项".to_string(),
                        marks: 4.0,
                    }],
                    keywords: vec![GradingKeyword {
                        keyword: "因式分解".to_string(),
                        marks: 2.0,
                    }],
                },
                RubricQuestion {
                    question_number: "Q2".to_string(),
                    max_marks: 10.0,
                    expected_answer: "略".to_string(),
                    steps: vec![],
                    keywords: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_question_lookup() {
        let rubric = sample_rubric();
        assert_eq!(rubric.question("Q1").unwrap().max_marks, 10.0);
        assert!(rubric.question("Q99").is_none());
    }

    #[test]
    fn test_toml_round_shape() {
        // 评分标准以 TOML 文件形式由老师编写
        let text = r#"
            exam_name = "单元测验"
            total_marks = 10

            [[questions]]
            question_number = "1"
            max_marks = 10
            expected_answer = "答案"
            steps = [{ description = "第一步", marks = 5 }]
            keywords = [{ keyword = "微积分", marks = 1 }]
        "#;
        let rubric: Rubric = toml::from_str(text).unwrap();
        assert_eq!(rubric.questions.len(), 1);
        assert_eq!(rubric.questions[0].steps[0].marks, 5.0);
        assert_eq!(rubric.questions[0].keywords[0].keyword, "微积分");
    }
}
