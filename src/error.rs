use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 配置错误（凭证/端点缺失等，发起任何网络请求之前就失败）
    Config(ConfigError),
    /// 校验错误（操作前置条件不满足，拒绝时不产生任何状态变更）
    Validation(ValidationError),
    /// 批改服务错误（网络、响应解析、结构不符）
    Provider(ProviderError),
    /// 文件操作错误
    File(FileError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Provider(e) => write!(f, "批改服务错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Provider(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 必需的 API 凭证缺失
    MissingCredential { var_name: String },
    /// 必需的 API 端点缺失
    MissingEndpoint { var_name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCredential { var_name } => {
                write!(f, "缺少必需的 API 凭证 (环境变量: {})", var_name)
            }
            ConfigError::MissingEndpoint { var_name } => {
                write!(f, "缺少必需的 API 端点 (环境变量: {})", var_name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 校验错误
#[derive(Debug)]
pub enum ValidationError {
    /// 尚未设置评分标准
    RubricNotSet,
    /// 找不到指定提交
    SubmissionNotFound { id: String },
    /// 该提交尚未批改
    NotGraded { id: String },
    /// 题目索引超出范围
    QuestionIndexOutOfRange { index: usize, count: usize },
    /// 该提交已有批改调用在进行中
    GradingInFlight { id: String },
    /// 仲裁意见不能为空
    EmptyResolutionComment,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::RubricNotSet => {
                write!(f, "尚未设置评分标准，无法批改")
            }
            ValidationError::SubmissionNotFound { id } => {
                write!(f, "找不到提交: {}", id)
            }
            ValidationError::NotGraded { id } => {
                write!(f, "提交 {} 尚未批改", id)
            }
            ValidationError::QuestionIndexOutOfRange { index, count } => {
                write!(f, "题目索引 {} 超出范围 [0, {})", index, count)
            }
            ValidationError::GradingInFlight { id } => {
                write!(f, "提交 {} 已有批改调用在进行中", id)
            }
            ValidationError::EmptyResolutionComment => {
                write!(f, "仲裁意见不能为空")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 批改服务错误
///
/// 任何一种批改服务错误都保证：目标提交的批改结果保持原样，不会半写
#[derive(Debug)]
pub enum ProviderError {
    /// API 调用失败
    RequestFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyResponse { model: String },
    /// JSON 解析失败
    JsonParseFailed {
        snippet: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::RequestFailed { model, source } => {
                write!(f, "批改 API 调用失败 (模型: {}): {}", model, source)
            }
            ProviderError::EmptyResponse { model } => {
                write!(f, "批改 API 返回内容为空 (模型: {})", model)
            }
            ProviderError::JsonParseFailed { snippet, source } => {
                write!(f, "批改结果 JSON 解析失败 (片段: {}): {}", snippet, source)
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::RequestFailed { source, .. }
            | ProviderError::JsonParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound { path: String },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<async_openai::error::OpenAIError> for AppError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        AppError::Provider(ProviderError::RequestFailed {
            model: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Provider(ProviderError::JsonParseFailed {
            snippet: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建"找不到提交"错误
    pub fn submission_not_found(id: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::SubmissionNotFound { id: id.into() })
    }

    /// 创建批改 API 调用错误
    pub fn provider_request_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Provider(ProviderError::RequestFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建批改结果解析错误
    pub fn provider_parse_failed(
        snippet: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Provider(ProviderError::JsonParseFailed {
            snippet: snippet.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
