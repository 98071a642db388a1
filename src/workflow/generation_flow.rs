//! 生成流程 - 流程层
//!
//! 核心职责：定义"一次生成"的完整处理流程
//!
//! 流程顺序：
//! 1. 构建 prompt
//! 2. 调用生成后端（带超时）
//! 3. 清洗响应
//! 4. 打包输出（网站任务额外生成预览页）

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{AppResult, GenerationError};
use crate::infrastructure::{ArchiveCodec, TextGenerator};
use crate::models::{ExtractedAsset, GenerationRequest, GenerationResult, GenerationTask};
use crate::services::llm_service::response_shape;
use crate::services::packager::{render_preview, Packager};
use crate::services::prompt_builder::{build_prompt, strip_zip_extension};
use crate::services::response_sanitizer::{sanitize_html, sanitize_scorm};

/// 生成产物
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub task: GenerationTask,
    /// 建议的下载文件名
    pub file_name: String,
    /// 输出压缩包
    pub archive: Vec<u8>,
    /// 网站预览页（图片已内联），SCORM 任务为 None
    pub preview_html: Option<String>,
    pub result: GenerationResult,
}

/// 下载文件名：`<原文件名去掉 .zip>_<任务>.zip`
pub fn output_file_name(source_file_name: &str, task: GenerationTask) -> String {
    let stem = strip_zip_extension(source_file_name);
    let stem = if stem.is_empty() { "vault" } else { stem };
    format!("{}_{}.zip", stem, task.key())
}

/// 生成流程
///
/// - 编排 prompt → 生成 → 清洗 → 打包
/// - 不持有请求状态，每次调用完全由参数决定
/// - 要么返回完整产物，要么返回错误，不暴露中间结果
pub struct GenerationFlow {
    generator: Arc<dyn TextGenerator>,
    packager: Packager,
    timeout: Duration,
}

impl GenerationFlow {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        codec: Arc<dyn ArchiveCodec>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            packager: Packager::new(codec),
            timeout,
        }
    }

    pub async fn run(
        &self,
        request: &GenerationRequest,
        assets: &[ExtractedAsset],
    ) -> AppResult<GeneratedArtifact> {
        let task = request.task;
        let prompt = build_prompt(request);
        let shape = response_shape(task);

        info!(
            "🤖 正在生成{} (模型: {}, prompt {} 字符)...",
            task.label(),
            self.generator.model_name(),
            prompt.chars().count()
        );

        let raw = tokio::time::timeout(self.timeout, self.generator.generate(&prompt, &shape))
            .await
            .map_err(|_| GenerationError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyContent.into());
        }
        debug!("收到响应 {} 字符", raw.chars().count());

        let result = match task {
            GenerationTask::Website => GenerationResult::Website(sanitize_html(&raw)?),
            GenerationTask::Scorm => GenerationResult::Scorm(sanitize_scorm(&raw)?),
        };

        let package_assets: &[ExtractedAsset] = match task {
            GenerationTask::Website => assets,
            GenerationTask::Scorm => &[],
        };
        let archive = self.packager.package(&result, package_assets)?;

        let preview_html = match &result {
            GenerationResult::Website(html) => Some(render_preview(html, assets)),
            GenerationResult::Scorm(_) => None,
        };

        let file_name = output_file_name(&request.source_file_name, task);
        info!("✓ {}生成完成: {} ({} 字节)", task.label(), file_name, archive.len());

        Ok(GeneratedArtifact {
            task,
            file_name,
            archive,
            preview_html,
            result,
        })
    }
}
