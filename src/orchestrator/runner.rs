//! 应用入口 - 编排层
//!
//! 唯一接触磁盘的模块：读取输入压缩包，写出生成结果

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ArchiveCodec, TextGenerator, ZipCodec};
use crate::services::{LlmService, VaultReader};
use crate::utils::logging::{log_extraction, log_startup, print_final_stats};
use crate::workflow::{GenerationFlow, Session};

/// 网站任务预览页的文件名
pub const PREVIEW_FILE: &str = "preview.html";

/// 应用主结构
pub struct App {
    config: Config,
    session: Session,
}

impl App {
    /// 初始化应用，使用 OpenAI 兼容后端
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        let generator: Arc<dyn TextGenerator> = Arc::new(LlmService::new(&config));
        Ok(Self::with_generator(config, generator))
    }

    /// 使用指定的生成后端组装应用
    pub fn with_generator(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let codec: Arc<dyn ArchiveCodec> = Arc::new(ZipCodec::new());
        let reader =
            VaultReader::new(codec.clone()).with_max_content_chars(config.max_content_chars);
        let flow = GenerationFlow::new(
            generator,
            codec,
            Duration::from_secs(config.generation_timeout_secs),
        );

        Self {
            config,
            session: Session::new(reader, flow),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 运行一次：读取 → 提取 → 生成 → 写出
    ///
    /// 返回输出压缩包的路径
    pub async fn run(&self) -> AppResult<PathBuf> {
        log_startup(&self.config);
        let started = Instant::now();

        let input = Path::new(&self.config.input_archive);
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| AppError::io(&self.config.input_archive, e))?;
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config.input_archive.clone());

        let content = self.session.upload(&file_name, bytes).await?;
        log_extraction(&file_name, &content);

        let artifact = self.session.generate(self.config.task).await?;

        let output_dir = Path::new(&self.config.output_dir);
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| AppError::io(&self.config.output_dir, e))?;

        let output_path = output_dir.join(&artifact.file_name);
        write_file(&output_path, &artifact.archive).await?;

        if let Some(preview) = &artifact.preview_html {
            let preview_path = output_dir.join(PREVIEW_FILE);
            write_file(&preview_path, preview.as_bytes()).await?;
            info!("🔍 预览页已保存至: {}", preview_path.display());
        }

        print_final_stats(
            &artifact,
            &output_path.display().to_string(),
            started.elapsed().as_secs_f64(),
        );

        Ok(output_path)
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> AppResult<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| AppError::io(path.display().to_string(), e))
}
