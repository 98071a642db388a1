//! 文本生成能力 - 基础设施层
//!
//! 生成后端被视为不透明的函数：prompt 进，文本出，可能失败

use async_trait::async_trait;

use crate::error::AppResult;

/// 期望的响应形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// 自由文本
    PlainText,
    /// 带字段约束的 JSON 对象，所有字段均为字符串
    JsonObject {
        /// schema 名称
        name: &'static str,
        required: Vec<&'static str>,
        optional: Vec<&'static str>,
    },
}

/// 文本生成能力
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 发送 prompt，返回原始文本（JsonObject 形态下为 JSON 字符串）
    async fn generate(&self, prompt: &str, shape: &ResponseShape) -> AppResult<String>;

    /// 模型名称（用于日志与错误信息）
    fn model_name(&self) -> &str;
}
