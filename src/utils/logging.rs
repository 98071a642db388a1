/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::VaultContent;
use crate::workflow::GeneratedArtifact;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 笔记库生成模式");
    info!("📥 输入压缩包: {}", config.input_archive);
    info!("🎯 生成任务: {}", config.task.label());
    info!("🤖 模型: {}", config.llm_model_name);
    info!("⏱️ 超时: {} 秒", config.generation_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录提取结果
///
/// # 参数
/// - `file_name`: 压缩包文件名
/// - `content`: 提取出的内容
pub fn log_extraction(file_name: &str, content: &VaultContent) {
    info!("\n{}", "─".repeat(60));
    info!("✓ {} 提取完成", file_name);
    info!("📝 文本长度: {} 字符", content.markdown_content.chars().count());
    info!("🖼️ 图片资源: {} 个", content.assets.len());
    if !content.assets.is_empty() {
        info!("   {}", truncate_text(&content.asset_names().join(", "), 120));
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `artifact`: 生成产物
/// - `output_path`: 输出压缩包路径
/// - `elapsed_secs`: 总耗时
pub fn print_final_stats(artifact: &GeneratedArtifact, output_path: &str, elapsed_secs: f64) {
    info!("\n{}", "=".repeat(60));
    info!("📊 {}生成完成", artifact.task.label());
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📦 输出文件: {} ({} 字节)", output_path, artifact.archive.len());
    info!("⏱️ 总耗时: {:.1} 秒", elapsed_secs);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
