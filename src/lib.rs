//! # Vault Site Builder
//!
//! 把 Obsidian 笔记库压缩包转换成网站或 SCORM 课件包的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `ArchiveCodec` - 压缩包读写能力（`ZipCodec`）
//! - `TextGenerator` - prompt 进、文本出的生成能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力都是纯函数或无状态服务
//! - `VaultReader` - 提取笔记文本和图片资源
//! - `prompt_builder` - 按任务构建 prompt
//! - `LlmService` - OpenAI 兼容后端
//! - `response_sanitizer` - 清洗模型返回的文本
//! - `Packager` - 打包输出并渲染预览页
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成"的完整处理流程
//! - `GenerationFlow` - 流程编排（prompt → 生成 → 清洗 → 打包）
//! - `Session` - 会话状态机（Upload → Menu → Generating → Download）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/runner` - 读取输入、驱动会话、写出结果
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ArchiveCodec, ResponseShape, TextGenerator, ZipCodec};
pub use models::{GenerationResult, GenerationTask, ScormFiles, VaultContent};
pub use orchestrator::App;
pub use workflow::{GeneratedArtifact, GenerationFlow, Session, SessionState};
