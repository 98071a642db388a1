//! LLM 服务 - 业务能力层
//!
//! 只负责"把 prompt 发给生成后端并拿回文本"的能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini, Azure, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, GenerationError};
use crate::infrastructure::{ResponseShape, TextGenerator};
use crate::models::output::{API_WRAPPER_JS, INDEX_HTML, MANIFEST_XML};
use crate::models::GenerationTask;

/// 任务对应的响应形态
///
/// 网站任务要自由文本；SCORM 任务要三个必填字符串字段的 JSON 对象
pub fn response_shape(task: GenerationTask) -> ResponseShape {
    match task {
        GenerationTask::Website => ResponseShape::PlainText,
        GenerationTask::Scorm => ResponseShape::JsonObject {
            name: "scorm_package",
            required: vec![INDEX_HTML, MANIFEST_XML, API_WRAPPER_JS],
            optional: Vec::new(),
        },
    }
}

/// 响应形态对应的 JSON Schema，自由文本时为 None
pub fn json_schema(shape: &ResponseShape) -> Option<JsonValue> {
    let ResponseShape::JsonObject {
        required, optional, ..
    } = shape
    else {
        return None;
    };

    let mut properties = Map::new();
    for field in required.iter().chain(optional.iter()) {
        properties.insert(field.to_string(), json!({ "type": "string" }));
    }

    Some(json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    }))
}

/// LLM 服务
///
/// 职责：
/// - 调用 OpenAI 兼容的 chat 接口
/// - 按响应形态设置 `response_format`
/// - 不认识笔记、资源和压缩包
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_output_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// 构建请求
    fn build_request(
        &self,
        prompt: &str,
        shape: &ResponseShape,
    ) -> AppResult<CreateChatCompletionRequest> {
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| self.failed(e))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .max_completion_tokens(self.max_output_tokens);

        if let (ResponseShape::JsonObject { name, .. }, Some(schema)) = (shape, json_schema(shape)) {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some("Files of a SCORM 1.2 package keyed by file name".to_string()),
                    name: name.to_string(),
                    schema: Some(schema),
                    strict: None,
                },
            });
        }

        builder.build().map_err(|e| self.failed(e))
    }

    fn failed(&self, e: impl std::fmt::Display) -> AppError {
        AppError::generation_failed(&self.model_name, e.to_string())
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str, shape: &ResponseShape) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("prompt 长度: {} 字符", prompt.chars().count());

        let request = self.build_request(prompt, shape)?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.failed(e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or(GenerationError::EmptyContent)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(GenerationError::EmptyContent.into());
        }

        Ok(content.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
