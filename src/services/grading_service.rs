//! AI 批改服务 - 业务能力层
//!
//! 只负责"把一张答卷批改成结构化结果"这一能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的视觉模型服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, ProviderError};
use crate::models::rubric::Rubric;
use crate::models::submission::{
    AnswerSheet, DisputeStatus, GradedQuestion, GradedResult, GradedStep,
};

/// 批改模型返回的原始 JSON 结构（camelCase）
///
/// 模型对申诉一无所知，申诉相关字段在转换时由本服务统一补齐
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderGradedResult {
    #[serde(default)]
    total_marks_awarded: f64,
    total_max_marks: f64,
    questions: Vec<ProviderGradedQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderGradedQuestion {
    question_number: String,
    marks_awarded: f64,
    max_marks: f64,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    steps: Vec<ProviderGradedStep>,
    #[serde(default)]
    keywords_found: Vec<String>,
    #[serde(default)]
    area_for_improvement: String,
}

#[derive(Debug, Deserialize)]
struct ProviderGradedStep {
    step: u32,
    #[serde(default)]
    description: String,
    correct: bool,
    marks: f64,
}

/// AI 批改服务
///
/// 职责：
/// - 调用视觉 LLM API 批改单张答卷
/// - 把模型返回的原始 JSON 转换为领域模型
/// - 每道题的申诉状态一律初始化为 Accepted
/// - 只处理单张答卷，不出现 Vec<Submission>
/// - 不关心流程顺序，不触碰应用状态
#[derive(Debug)]
pub struct GradingService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl GradingService {
    /// 创建新的批改服务
    ///
    /// 凭证或端点缺失时立即失败，不会发起任何网络请求
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.llm_api_key.trim().is_empty() {
            return Err(AppError::Config(ConfigError::MissingCredential {
                var_name: "LLM_API_KEY".to_string(),
            }));
        }
        if config.llm_api_base_url.trim().is_empty() {
            return Err(AppError::Config(ConfigError::MissingEndpoint {
                var_name: "LLM_API_BASE_URL".to_string(),
            }));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        })
    }

    /// 批改一张答卷
    ///
    /// 这是系统里唯一会挂起的边界。任何传输或解析失败都返回
    /// `ProviderError`，调用方保证目标提交的旧结果原样保留。
    ///
    /// # 参数
    /// - `sheet`: base64 编码的答卷图片 + MIME 类型
    /// - `rubric`: 批改所依据的评分标准
    ///
    /// # 返回
    /// 返回完整的批改结果，申诉状态已全部置为 Accepted，总分已重算
    pub async fn grade(&self, sheet: &AnswerSheet, rubric: &Rubric) -> AppResult<GradedResult> {
        debug!(
            "调用批改 API，模型: {}, 图片类型: {}, 数据长度: {} 字符",
            self.model_name,
            sheet.mime,
            sheet.data_base64.len()
        );

        let (user_message, system_message) = build_grading_messages(rubric)?;

        // 系统消息
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()?;

        // 用户消息：批改指令 + 答卷图片（data URL）
        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText { text: user_message },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: sheet.data_url(),
                        detail: Some(ImageDetail::High),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        // 低温度，批改结果尽量确定
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.1)
            .max_tokens(4096u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("批改 API 调用失败: {}", e);
            AppError::provider_request_failed(&self.model_name, e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Provider(ProviderError::EmptyResponse {
                    model: self.model_name.clone(),
                })
            })?;

        debug!("批改 API 调用成功，响应长度: {} 字符", content.len());

        parse_graded_response(&content)
    }
}

/// 构建批改消息
///
/// 返回 (user_message, system_message)
fn build_grading_messages(rubric: &Rubric) -> AppResult<(String, String)> {
    let system_message = "你是一位严格的阅卷老师，负责根据评分标准批改学生的手写答卷。\
                          你需要逐题对照评分标准中的步骤和关键词给分，\
                          并以严格的 JSON 格式返回批改结果。"
        .to_string();

    let rubric_json = serde_json::to_string_pretty(rubric)?;

    let user_message = format!(
        r#"请批改图片中的学生答卷。

【批改要求】
1. 仔细识别答卷图片中每道题的作答内容
2. 逐题对照下方评分标准中的步骤（steps）和关键词（keywords）给分
3. 从严批改：步骤部分正确时标记 correct 为 false，但可按标准酌情给部分分
4. 为每道题写简洁、有建设性的反馈（feedback），说明得分和扣分原因
5. 为每道题指出一个最需要改进的方面（areaForImprovement）
6. 计算总分

【评分标准】
{}

【输出格式】
只返回一个 JSON 对象，不要输出任何其他文字、markdown 标记或代码围栏：
{{
  "totalMarksAwarded": 数字,
  "totalMaxMarks": 数字,
  "questions": [
    {{
      "questionNumber": "题号字符串",
      "marksAwarded": 数字,
      "maxMarks": 数字,
      "feedback": "反馈",
      "steps": [{{ "step": 序号, "description": "步骤描述", "correct": true或false, "marks": 数字 }}],
      "keywordsFound": ["识别到的关键词"],
      "areaForImprovement": "需要改进的方面"
    }}
  ]
}}"#,
        rubric_json
    );

    Ok((user_message, system_message))
}

/// 从模型响应中提取 JSON 文本
///
/// 模型偶尔会无视指令包上代码围栏或附带说明文字，这里做两层兜底：
/// 1. 优先取 ```json ... ``` 围栏内的内容
/// 2. 否则取第一个 `{` 到最后一个 `}` 之间的内容
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Ok(re) = Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```") {
        if let Some(caps) = re.captures(trimmed) {
            if let Some(inner) = caps.get(1) {
                return inner.as_str();
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

/// 解析模型响应并转换为领域模型
///
/// - 每道题的申诉状态统一置为 Accepted（模型没有申诉概念）
/// - 单题得分收拢到 [0, maxMarks]
/// - 总分由各题得分重新推导，不信任模型给的合计值
fn parse_graded_response(response: &str) -> AppResult<GradedResult> {
    let json_text = extract_json(response);

    let raw: ProviderGradedResult = serde_json::from_str(json_text).map_err(|e| {
        let snippet = crate::utils::logging::truncate_text(json_text, 120);
        warn!("批改结果解析失败: {} (片段: {})", e, snippet);
        AppError::provider_parse_failed(snippet, e)
    })?;

    let ProviderGradedResult {
        total_marks_awarded: provider_total,
        total_max_marks,
        questions: raw_questions,
    } = raw;

    let questions: Vec<GradedQuestion> = raw_questions
        .into_iter()
        .map(|q| {
            let upper = if q.max_marks > 0.0 { q.max_marks } else { 0.0 };
            let marks = q.marks_awarded.max(0.0).min(upper);
            if marks != q.marks_awarded {
                warn!(
                    "题目 {} 模型给分 {} 超出 [0, {}]，已收拢为 {}",
                    q.question_number, q.marks_awarded, upper, marks
                );
            }
            GradedQuestion {
                question_number: q.question_number,
                marks_awarded: marks,
                max_marks: q.max_marks,
                feedback: q.feedback,
                steps: q
                    .steps
                    .into_iter()
                    .map(|s| GradedStep {
                        step_index: s.step,
                        description: s.description,
                        correct: s.correct,
                        marks_awarded: s.marks,
                    })
                    .collect(),
                keywords_found: q.keywords_found,
                area_for_improvement: q.area_for_improvement,
                dispute_status: DisputeStatus::Accepted,
            }
        })
        .collect();

    let mut result = GradedResult {
        total_marks_awarded: 0.0,
        total_max_marks,
        questions,
    };
    result.recompute_total();

    if (provider_total - result.total_marks_awarded).abs() > 1e-9 {
        debug!(
            "模型合计 {} 与重算结果 {} 不一致，以重算为准",
            provider_total, result.total_marks_awarded
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rubric::RubricQuestion;

    fn sample_response() -> &'static str {
        r#"{
            "totalMarksAwarded": 999,
            "totalMaxMarks": 20,
            "questions": [
                {
                    "questionNumber": "Q1",
                    "marksAwarded": 8,
                    "maxMarks": 10,
                    "feedback": "解题思路正确，最后一步计算出错",
                    "steps": [
                        { "step": 1, "description": "列方程", "correct": true, "marks": 4 },
                        { "step": 2, "description": "求解", "correct": false, "marks": 4 }
                    ],
                    "keywordsFound": ["二次函数"],
                    "areaForImprovement": "注意计算细心程度"
                },
                {
                    "questionNumber": "Q2",
                    "marksAwarded": 12,
                    "maxMarks": 10,
                    "feedback": "完整",
                    "steps": [],
                    "keywordsFound": [],
                    "areaForImprovement": "无"
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_defaults_dispute_and_rederives_total() {
        let result = parse_graded_response(sample_response()).unwrap();

        // 申诉状态统一 Accepted
        assert!(result
            .questions
            .iter()
            .all(|q| q.dispute_status == DisputeStatus::Accepted));

        // Q2 的 12/10 被收拢为 10；总分重算，不信任模型的 999
        assert_eq!(result.questions[1].marks_awarded, 10.0);
        assert_eq!(result.total_marks_awarded, 18.0);
        assert_eq!(result.total_max_marks, 20.0);
    }

    #[test]
    fn test_parse_preserves_step_details() {
        let result = parse_graded_response(sample_response()).unwrap();
        let steps = &result.questions[0].steps;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step_index, 1);
        assert!(steps[0].correct);
        assert!(!steps[1].correct);
        assert_eq!(result.questions[0].keywords_found, vec!["二次函数"]);
    }

    #[test]
    fn test_extract_json_from_code_fence() {
        let fenced = format!("好的，批改结果如下：\n```json\n{}\n```\n", sample_response());
        let result = parse_graded_response(&fenced).unwrap();
        assert_eq!(result.questions.len(), 2);
    }

    #[test]
    fn test_extract_json_from_surrounding_text() {
        let noisy = format!("批改结果：{} 以上。", sample_response());
        let result = parse_graded_response(&noisy).unwrap();
        assert_eq!(result.questions.len(), 2);
    }

    #[test]
    fn test_parse_malformed_is_provider_error() {
        let err = parse_graded_response("这不是 JSON").unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::JsonParseFailed { .. })
        ));
    }

    #[test]
    fn test_build_messages_embed_rubric() {
        let rubric = Rubric {
            exam_name: "期末物理".to_string(),
            total_marks: 10.0,
            questions: vec![RubricQuestion {
                question_number: "Q1".to_string(),
                max_marks: 10.0,
                expected_answer: "F = ma".to_string(),
                steps: vec![],
                keywords: vec![],
            }],
        };
        let (user, system) = build_grading_messages(&rubric).unwrap();
        assert!(user.contains("期末物理"));
        assert!(user.contains("F = ma"));
        assert!(system.contains("阅卷"));
    }

    #[test]
    fn test_missing_credential_fails_fast() {
        let config = Config {
            llm_api_key: String::new(),
            ..Config::default()
        };
        let err = GradingService::new(&config).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::MissingCredential { .. })
        ));
    }
}
