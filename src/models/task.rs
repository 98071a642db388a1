use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 生成任务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationTask {
    /// 单文件交互式网站
    Website,
    /// SCORM 1.2 课件包
    Scorm,
}

impl GenerationTask {
    /// 配置中使用的标识
    pub fn key(self) -> &'static str {
        match self {
            GenerationTask::Website => "website",
            GenerationTask::Scorm => "scorm",
        }
    }

    /// 展示名称
    pub fn label(self) -> &'static str {
        match self {
            GenerationTask::Website => "网站",
            GenerationTask::Scorm => "SCORM 课件包",
        }
    }
}

impl fmt::Display for GenerationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GenerationTask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "website" => Ok(GenerationTask::Website),
            "scorm" => Ok(GenerationTask::Scorm),
            other => Err(format!("未知的生成任务: {}", other)),
        }
    }
}

/// 一次生成请求
///
/// 完全决定 prompt 内容，不依赖任何隐藏状态
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// 上传压缩包的文件名
    pub source_file_name: String,
    /// 拼接后的笔记文本
    pub extracted_text: String,
    /// 图片资源文件名
    pub asset_names: Vec<String>,
    pub task: GenerationTask,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task() {
        assert_eq!("website".parse::<GenerationTask>().unwrap(), GenerationTask::Website);
        assert_eq!(" SCORM ".parse::<GenerationTask>().unwrap(), GenerationTask::Scorm);
        assert!("pdf".parse::<GenerationTask>().is_err());
    }

    #[test]
    fn test_display_matches_key() {
        assert_eq!(GenerationTask::Scorm.to_string(), "scorm");
    }
}
