//! 会话状态机 - 流程层
//!
//! 一个会话同一时间只处理一个请求：
//!
//! ```text
//! Upload ──upload──▶ Extracting ──成功──▶ Menu ──generate──▶ Generating ──成功──▶ Download
//!   ▲                    │失败                ▲                  │失败
//!   │                    ▼                    └──────────────────┘
//!   └──────────────── start_over（任意状态）
//! ```
//!
//! 处理中再次 upload / generate 会立即返回 `SessionError::Busy`。
//! 处理中调用 start_over 不会中断后台任务，但其结果会被丢弃。

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, SessionError};
use crate::models::{GenerationRequest, GenerationTask, VaultContent};
use crate::services::VaultReader;
use crate::workflow::generation_flow::{GeneratedArtifact, GenerationFlow};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 等待上传
    Upload,
    /// 正在提取压缩包
    Extracting,
    /// 已提取，等待选择生成任务
    Menu,
    /// 正在生成
    Generating(GenerationTask),
    /// 生成完成，可以下载
    Download(GenerationTask),
}

impl SessionState {
    /// 是否有请求在处理中
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Extracting | SessionState::Generating(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Upload => write!(f, "Upload"),
            SessionState::Extracting => write!(f, "Extracting"),
            SessionState::Menu => write!(f, "Menu"),
            SessionState::Generating(task) => write!(f, "Generating({})", task),
            SessionState::Download(task) => write!(f, "Download({})", task),
        }
    }
}

#[derive(Default)]
struct SessionInner {
    state: Option<SessionState>,
    /// 每次 start_over 递增，用来识别过期的结果
    epoch: u64,
    source_file_name: Option<String>,
    content: Option<Arc<VaultContent>>,
    artifact: Option<Arc<GeneratedArtifact>>,
    last_error: Option<String>,
}

impl SessionInner {
    fn state(&self) -> SessionState {
        self.state.unwrap_or(SessionState::Upload)
    }

    /// 检查当前状态是否允许 `action`
    fn guard(&self, allowed: SessionState, action: &str) -> Result<(), SessionError> {
        let state = self.state();
        if state.is_busy() {
            return Err(SessionError::Busy);
        }
        if state != allowed {
            return Err(SessionError::InvalidTransition {
                from: state.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.state = Some(SessionState::Upload);
        self.source_file_name = None;
        self.content = None;
        self.artifact = None;
        self.last_error = None;
    }
}

/// 一个用户会话
///
/// 提取内容和生成结果都只属于当前会话，start_over 后全部丢弃
pub struct Session {
    inner: Mutex<SessionInner>,
    reader: VaultReader,
    flow: GenerationFlow,
}

impl Session {
    pub fn new(reader: VaultReader, flow: GenerationFlow) -> Self {
        Self {
            inner: Mutex::new(SessionInner::default()),
            reader,
            flow,
        }
    }

    /// 当前状态
    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state()
    }

    /// 最近一次失败的提示信息
    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.last_error.clone()
    }

    /// 已提取的内容
    pub async fn content(&self) -> Option<Arc<VaultContent>> {
        self.inner.lock().await.content.clone()
    }

    /// 最近一次生成的产物
    pub async fn artifact(&self) -> Option<Arc<GeneratedArtifact>> {
        self.inner.lock().await.artifact.clone()
    }

    /// 上传压缩包：Upload → Extracting → Menu
    ///
    /// 失败时回到 Upload 并记录错误
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<Arc<VaultContent>> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            inner.guard(SessionState::Upload, "upload")?;
            inner.state = Some(SessionState::Extracting);
            inner.last_error = None;
            inner.epoch
        };

        info!("📦 正在读取压缩包: {} ({} 字节)", file_name, bytes.len());

        let reader = self.reader.clone();
        let name = file_name.to_string();
        let outcome = tokio::task::spawn_blocking(move || reader.extract(&name, &bytes))
            .await
            .unwrap_or_else(|e| Err(AppError::Internal(format!("提取任务异常退出: {}", e))));

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            warn!("会话已重置，丢弃 {} 的提取结果", file_name);
            return Err(SessionError::Abandoned.into());
        }

        match outcome {
            Ok(content) => {
                let content = Arc::new(content);
                inner.state = Some(SessionState::Menu);
                inner.source_file_name = Some(file_name.to_string());
                inner.content = Some(content.clone());
                Ok(content)
            }
            Err(e) => {
                error!("❌ 压缩包处理失败: {}", e);
                inner.state = Some(SessionState::Upload);
                inner.last_error = Some(format!("处理压缩包失败。{}", e));
                Err(e)
            }
        }
    }

    /// 生成：Menu → Generating → Download
    ///
    /// 失败时回到 Menu，提取内容保留，可以直接重试
    pub async fn generate(&self, task: GenerationTask) -> AppResult<Arc<GeneratedArtifact>> {
        let (epoch, request, content) = {
            let mut inner = self.inner.lock().await;
            inner.guard(SessionState::Menu, "generate")?;

            let (Some(content), Some(source_file_name)) =
                (inner.content.clone(), inner.source_file_name.clone())
            else {
                let err = SessionError::NoContent;
                inner.last_error = Some(err.to_string());
                return Err(err.into());
            };

            let request = GenerationRequest {
                source_file_name,
                extracted_text: content.markdown_content.clone(),
                asset_names: content.asset_names(),
                task,
            };

            inner.state = Some(SessionState::Generating(task));
            inner.last_error = None;
            (inner.epoch, request, content)
        };

        let outcome = self.flow.run(&request, &content.assets).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            warn!("会话已重置，丢弃{}生成结果", task.label());
            return Err(SessionError::Abandoned.into());
        }

        match outcome {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                inner.state = Some(SessionState::Download(task));
                inner.artifact = Some(artifact.clone());
                Ok(artifact)
            }
            Err(e) => {
                error!("❌ {}生成失败: {}", task.label(), e);
                inner.state = Some(SessionState::Menu);
                inner.last_error = Some(format!("生成{}失败。{}", task.label(), e));
                Err(e)
            }
        }
    }

    /// 重新开始：丢弃所有内容，回到 Upload
    pub async fn start_over(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state().is_busy() {
            info!("处理中重置会话，后台结果将被丢弃");
        }
        inner.reset();
    }
}
