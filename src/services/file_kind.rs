//! 按扩展名对压缩包条目分类
//!
//! 扩展名表和 MIME 表都是静态查找表，匹配时不区分大小写

use phf::phf_map;

/// 条目类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// 笔记文本
    Note,
    /// 图片资源
    Image,
}

static KINDS: phf::Map<&'static str, FileKind> = phf_map! {
    "md" => FileKind::Note,
    "png" => FileKind::Image,
    "jpg" => FileKind::Image,
    "jpeg" => FileKind::Image,
    "gif" => FileKind::Image,
    "svg" => FileKind::Image,
    "webp" => FileKind::Image,
};

static MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "svg" => "image/svg+xml",
    "webp" => "image/webp",
};

/// 无法识别扩展名时使用的 MIME
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// 文件名的小写扩展名（不含点），没有扩展名时返回 None
pub fn extension(path: &str) -> Option<String> {
    let name = basename(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// 按扩展名分类，不在表中的条目返回 None（忽略）
pub fn classify(path: &str) -> Option<FileKind> {
    extension(path).and_then(|ext| KINDS.get(ext.as_str()).copied())
}

/// 按扩展名推断 MIME
pub fn mime_type(name: &str) -> &'static str {
    extension(name)
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or(DEFAULT_MIME)
}

/// 去掉目录部分，只保留文件名
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("notes/Chapter1.MD"), Some(FileKind::Note));
        assert_eq!(classify("img/Photo.JPeG"), Some(FileKind::Image));
        assert_eq!(classify("diagram.svg"), Some(FileKind::Image));
    }

    #[test]
    fn test_unknown_entries_are_ignored() {
        assert_eq!(classify("data.json"), None);
        assert_eq!(classify(".obsidian/workspace"), None);
        assert_eq!(classify("README"), None);
        assert_eq!(classify("archive.md.bak"), None);
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("images/sub/pic.png"), "pic.png");
        assert_eq!(basename("pic.png"), "pic.png");
        assert_eq!(basename("win\\style\\pic.png"), "pic.png");
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("logo.png"), "image/png");
        assert_eq!(mime_type("a.JPG"), "image/jpeg");
        assert_eq!(mime_type("vector.svg"), "image/svg+xml");
        assert_eq!(mime_type("blob.bin"), DEFAULT_MIME);
        assert_eq!(mime_type("noext"), DEFAULT_MIME);
    }
}
