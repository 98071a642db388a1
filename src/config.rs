use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::GenerationTask;
use crate::services::vault_reader::DEFAULT_MAX_CONTENT_CHARS;

/// 生成服务凭证所在的环境变量
pub const API_KEY_VAR: &str = "API_KEY";

/// 配置文件路径所在的环境变量
pub const CONFIG_PATH_VAR: &str = "SITE_BUILDER_CONFIG";

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "site_builder.toml";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次生成的最大输出 token 数
    pub max_output_tokens: u32,
    /// 生成调用超时（秒）
    pub generation_timeout_secs: u64,
    // --- 提取配置 ---
    /// 拼接后笔记文本的最大字符数
    pub max_content_chars: usize,
    // --- 运行配置 ---
    /// 待处理的压缩包路径
    pub input_archive: String,
    /// 输出目录
    pub output_dir: String,
    /// 生成任务
    pub task: GenerationTask,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-pro".to_string(),
            max_output_tokens: 65_536,
            generation_timeout_secs: 300,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            input_archive: "vault.zip".to_string(),
            output_dir: "output".to_string(),
            task: GenerationTask::Website,
            verbose_logging: false,
        }
    }
}

/// 配置文件内容，所有字段均可省略
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    llm_api_base_url: Option<String>,
    llm_model_name: Option<String>,
    max_output_tokens: Option<u32>,
    generation_timeout_secs: Option<u64>,
    max_content_chars: Option<usize>,
    input_archive: Option<String>,
    output_dir: Option<String>,
    task: Option<GenerationTask>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    ///
    /// 凭证缺失属于启动期致命错误
    pub fn load() -> AppResult<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = Self::default();
        if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
            config.apply_toml(&path, &content)?;
            debug!("已加载配置文件: {}", path);
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 仅从环境变量加载
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 合并 TOML 配置文件内容
    pub fn apply_toml(&mut self, path: &str, content: &str) -> AppResult<()> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::FileParseFailed {
            path: path.to_string(),
            source: e,
        })?;

        if let Some(v) = file.llm_api_base_url {
            self.llm_api_base_url = v;
        }
        if let Some(v) = file.llm_model_name {
            self.llm_model_name = v;
        }
        if let Some(v) = file.max_output_tokens {
            self.max_output_tokens = v;
        }
        if let Some(v) = file.generation_timeout_secs {
            self.generation_timeout_secs = v;
        }
        if let Some(v) = file.max_content_chars {
            self.max_content_chars = v;
        }
        if let Some(v) = file.input_archive {
            self.input_archive = v;
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file.task {
            self.task = v;
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
        Ok(())
    }

    /// 合并环境变量
    ///
    /// `lookup` 返回变量值，便于在测试中替换真实环境
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(API_KEY_VAR) {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_OUTPUT_TOKENS", "u32")? {
            self.max_output_tokens = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_TIMEOUT_SECS", "u64")? {
            self.generation_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONTENT_CHARS", "usize")? {
            self.max_content_chars = v;
        }
        if let Some(v) = lookup("INPUT_ARCHIVE") {
            self.input_archive = v;
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Some(v) = parse_var(&lookup, "GENERATION_TASK", "website | scorm")? {
            self.task = v;
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(())
    }

    /// 检查必填项
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: API_KEY_VAR.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var_name) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }
        .into()),
    }
}
