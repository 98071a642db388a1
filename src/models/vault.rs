//! 从压缩包中提取出的内容

/// 图片资源
///
/// `name` 只保留文件名（去掉目录），在一次生成请求内唯一
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedAsset {
    pub name: String,
    pub data: Vec<u8>,
}

impl ExtractedAsset {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// 提取结果：拼接后的笔记文本 + 图片资源
#[derive(Debug, Clone, Default)]
pub struct VaultContent {
    pub markdown_content: String,
    pub assets: Vec<ExtractedAsset>,
}

impl VaultContent {
    /// 资源文件名列表（保持提取顺序）
    pub fn asset_names(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.name.clone()).collect()
    }
}
