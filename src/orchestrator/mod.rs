//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源组装和一次完整运行的调度。
//!
//! ### `runner` - 应用入口
//! - 组装生成后端、压缩包编解码器和会话
//! - 从磁盘读取输入压缩包，驱动会话 upload → generate
//! - 把输出压缩包（网站任务还有预览页）写到输出目录
//!
//! ## 层次关系
//!
//! ```text
//! runner::App (读写磁盘、汇总统计)
//!     ↓
//! workflow::Session (状态机，一次一个请求)
//!     ↓
//! workflow::GenerationFlow (prompt → 生成 → 清洗 → 打包)
//!     ↓
//! services (能力层：vault_reader / llm / sanitizer / packager)
//!     ↓
//! infrastructure (ArchiveCodec / TextGenerator)
//! ```

pub mod runner;

pub use runner::App;
