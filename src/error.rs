use thiserror::Error;

/// 应用程序错误类型
///
/// 每个变体的 Display 文本都可以直接展示给用户
#[derive(Debug, Error)]
pub enum AppError {
    /// 压缩包相关错误
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    /// 生成服务错误
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// 会话状态错误
    #[error(transparent)]
    Session(#[from] SessionError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 后台任务异常退出
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 压缩包读写错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 无法打开或解析压缩包
    #[error("无法读取压缩包: {source}")]
    ReadFailed {
        #[source]
        source: zip::result::ZipError,
    },
    /// 压缩包中没有任何笔记文件
    #[error("压缩包中没有找到 Markdown (.md) 笔记文件")]
    NoTextContent,
    /// 读取单个条目失败（非致命）
    #[error("无法读取压缩包条目 {name}: {message}")]
    EntryReadFailed { name: String, message: String },
    /// 笔记文件不是合法的 UTF-8（非致命）
    #[error("无法将 {name} 解码为文本: {source}")]
    EntryDecodeFailed {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// 写出压缩包失败
    #[error("生成压缩包失败: {source}")]
    WriteFailed {
        #[source]
        source: zip::result::ZipError,
    },
}

/// 生成服务错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 后端调用失败
    #[error("AI 内容生成失败 (模型: {model}): {message}")]
    Failed { model: String, message: String },
    /// 后端调用超时
    #[error("AI 内容生成超时 (超过 {secs} 秒)，请重试")]
    Timeout { secs: u64 },
    /// 后端返回了空内容
    #[error("AI 返回内容为空，请重试")]
    EmptyContent,
    /// 返回的文本无法整理成 HTML 文档
    #[error("AI 没有返回有效的 HTML 内容，可能只返回了部分结果")]
    InvalidOutput,
    /// 结构化返回缺少必填字段
    #[error("AI 返回的 SCORM 包不完整 (缺少 {missing})，请重试")]
    IncompleteOutput { missing: String },
}

/// 会话状态错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 已有请求在处理中
    #[error("已有请求正在处理中，请等待完成后再试")]
    Busy,
    /// 当前状态不允许该操作
    #[error("当前状态 {from} 不允许执行 {action}")]
    InvalidTransition { from: String, action: String },
    /// 没有可用的提取内容
    #[error("文件内容未正确处理，请重新上传")]
    NoContent,
    /// 请求进行中会话被重置，结果已丢弃
    #[error("请求已被放弃，结果已丢弃")]
    Abandoned,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 创建生成失败错误
    pub fn generation_failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Generation(GenerationError::Failed {
            model: model.into(),
            message: message.into(),
        })
    }

    /// 是否为会话忙碌错误
    pub fn is_busy(&self) -> bool {
        matches!(self, AppError::Session(SessionError::Busy))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
