/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时进行的批改调用数量
    pub max_concurrent_gradings: usize,
    /// 答卷图片存放目录
    pub intake_folder: String,
    /// 评分标准 TOML 文件路径
    pub rubric_file: String,
    /// 状态快照文件路径
    pub storage_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_gradings: 4,
            intake_folder: "answer_sheets".to_string(),
            rubric_file: "rubric.toml".to_string(),
            storage_file: "grader_state.json".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_gradings: std::env::var("MAX_CONCURRENT_GRADINGS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_gradings),
            intake_folder: std::env::var("INTAKE_FOLDER").unwrap_or(default.intake_folder),
            rubric_file: std::env::var("RUBRIC_FILE").unwrap_or(default.rubric_file),
            storage_file: std::env::var("STORAGE_FILE").unwrap_or(default.storage_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }
}
