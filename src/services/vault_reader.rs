//! 笔记压缩包读取服务 - 业务能力层
//!
//! 只负责"从压缩包中提取笔记文本和图片"的能力，不关心生成流程

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppResult, ArchiveError};
use crate::infrastructure::ArchiveCodec;
use crate::models::{ExtractedAsset, VaultContent};
use crate::services::file_kind::{self, FileKind};

/// 拼接文本的默认最大字符数
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 100_000;

/// 超出上限时追加的截断提示
pub const TRUNCATION_NOTICE: &str = "\n\n... (content truncated due to length)";

/// 拼接文本的首行
pub fn header_line(archive_name: &str) -> String {
    format!("CONTEXT FROM OBSIDIAN VAULT (FILENAME: {})\n\n", archive_name)
}

/// 单个笔记文件的开始标记
pub fn start_marker(path: &str) -> String {
    format!("--- START OF FILE: {} ---", path)
}

/// 单个笔记文件的结束标记
pub fn end_marker(path: &str) -> String {
    format!("--- END OF FILE: {} ---", path)
}

/// 笔记压缩包读取服务
///
/// 职责：
/// - 按扩展名把条目分为笔记和图片，其余忽略
/// - 按压缩包枚举顺序拼接笔记文本，并按字符数截断
/// - 图片只保留文件名，同名时保留第一个
/// - 单个条目失败只记录警告，不中断提取
#[derive(Clone)]
pub struct VaultReader {
    codec: Arc<dyn ArchiveCodec>,
    max_content_chars: usize,
}

impl VaultReader {
    pub fn new(codec: Arc<dyn ArchiveCodec>) -> Self {
        Self {
            codec,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    /// 自定义截断上限
    pub fn with_max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.max_content_chars = max_content_chars;
        self
    }

    /// 提取压缩包内容
    ///
    /// # 参数
    /// - `archive_name`: 上传时声明的文件名，写入首行
    /// - `bytes`: 压缩包原始字节
    ///
    /// # 返回
    /// 没有任何可解码的笔记时返回 `ArchiveError::NoTextContent`
    pub fn extract(&self, archive_name: &str, bytes: &[u8]) -> AppResult<VaultContent> {
        let mut reader = self.codec.open(bytes)?;
        let names = reader.file_names().to_vec();

        let mut note_indices = Vec::new();
        let mut image_indices = Vec::new();
        for (index, name) in names.iter().enumerate() {
            match file_kind::classify(name) {
                Some(FileKind::Note) => note_indices.push(index),
                Some(FileKind::Image) => image_indices.push(index),
                None => debug!("忽略条目: {}", name),
            }
        }

        debug!(
            "压缩包 {} 共 {} 个文件: 笔记 {} 个, 图片 {} 个",
            archive_name,
            names.len(),
            note_indices.len(),
            image_indices.len()
        );

        if note_indices.is_empty() {
            return Err(ArchiveError::NoTextContent.into());
        }

        let mut combined = header_line(archive_name);
        let mut decoded_notes = 0usize;

        for index in note_indices {
            let name = &names[index];
            let text = match reader.read(index).and_then(|data| decode_note(name, data)) {
                Ok(text) => text,
                Err(e) => {
                    warn!("⚠️ 跳过笔记 {}: {}", name, e);
                    continue;
                }
            };

            combined.push_str(&start_marker(name));
            combined.push_str("\n\n");
            combined.push_str(text.trim());
            combined.push_str("\n\n");
            combined.push_str(&end_marker(name));
            combined.push_str("\n\n");
            decoded_notes += 1;
        }

        if decoded_notes == 0 {
            return Err(ArchiveError::NoTextContent.into());
        }

        let markdown_content = truncate_content(combined, self.max_content_chars);

        let mut assets: Vec<ExtractedAsset> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for index in image_indices {
            let path = &names[index];
            let name = file_kind::basename(path).to_string();

            if seen.contains(&name) {
                warn!("⚠️ 资源文件名重复，保留第一个: {} (跳过 {})", name, path);
                continue;
            }

            match reader.read(index) {
                Ok(data) => {
                    seen.insert(name.clone());
                    assets.push(ExtractedAsset::new(name, data));
                }
                Err(e) => warn!("⚠️ 跳过资源 {}: {}", path, e),
            }
        }

        info!(
            "✓ 提取完成: {} 个笔记, {} 个图片, 文本 {} 字符",
            decoded_notes,
            assets.len(),
            markdown_content.chars().count()
        );

        Ok(VaultContent {
            markdown_content,
            assets,
        })
    }
}

fn decode_note(name: &str, data: Vec<u8>) -> Result<String, ArchiveError> {
    let text = String::from_utf8(data).map_err(|source| ArchiveError::EntryDecodeFailed {
        name: name.to_string(),
        source,
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// 按字符数截断，超出时追加截断提示
///
/// 截断只发生在字符边界上
pub fn truncate_content(mut content: String, max_chars: usize) -> String {
    if let Some((byte_index, _)) = content.char_indices().nth(max_chars) {
        content.truncate(byte_index);
        content.push_str(TRUNCATION_NOTICE);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ZipCodec;

    fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let entries: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|(name, data)| (name.to_string(), data.to_vec()))
            .collect();
        ZipCodec::new().write(&entries).unwrap()
    }

    fn reader() -> VaultReader {
        VaultReader::new(Arc::new(ZipCodec::new()))
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in data {
            crc ^= byte as u32;
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    /// 手工拼一个 Stored 压缩包
    ///
    /// `declared_size` 为 Some 时，中央目录通过 zip64 扩展字段声明这个解压大小
    fn stored_zip(files: &[(&str, &[u8], Option<u64>)]) -> Vec<u8> {
        const DOS_DATE: u16 = (44 << 9) | (1 << 5) | 1;
        let mut out = Vec::new();
        let mut central = Vec::new();

        for (name, data, declared_size) in files {
            let offset = out.len() as u32;
            let crc = crc32(data);
            let len = data.len() as u32;

            out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
            for field in [20u16, 0, 0, 0, DOS_DATE] {
                out.extend_from_slice(&field.to_le_bytes());
            }
            for field in [crc, len, len] {
                out.extend_from_slice(&field.to_le_bytes());
            }
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(data);

            let (version, uncompressed, extra_len) = match declared_size {
                Some(_) => (45u16, u32::MAX, 12u16),
                None => (20u16, len, 0u16),
            };
            central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
            for field in [20u16, version, 0, 0, 0, DOS_DATE] {
                central.extend_from_slice(&field.to_le_bytes());
            }
            for field in [crc, len, uncompressed] {
                central.extend_from_slice(&field.to_le_bytes());
            }
            for field in [name.len() as u16, extra_len, 0, 0, 0] {
                central.extend_from_slice(&field.to_le_bytes());
            }
            central.extend_from_slice(&0u32.to_le_bytes());
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
            if let Some(size) = declared_size {
                central.extend_from_slice(&1u16.to_le_bytes());
                central.extend_from_slice(&8u16.to_le_bytes());
                central.extend_from_slice(&size.to_le_bytes());
            }
        }

        let central_offset = out.len() as u32;
        out.extend_from_slice(&central);
        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        let count = files.len() as u16;
        for field in [0u16, 0, count, count] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&(central.len() as u32).to_le_bytes());
        out.extend_from_slice(&central_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_extract_notes_without_assets() {
        let bytes = build_zip(&[("study/Chapter1.md", b"  # Atoms \n")]);
        let content = reader().extract("physics.zip", &bytes).unwrap();

        assert!(content.assets.is_empty());
        assert!(content
            .markdown_content
            .starts_with("CONTEXT FROM OBSIDIAN VAULT (FILENAME: physics.zip)\n\n"));
        assert_eq!(
            content.markdown_content,
            "CONTEXT FROM OBSIDIAN VAULT (FILENAME: physics.zip)\n\n\
             --- START OF FILE: study/Chapter1.md ---\n\n# Atoms\n\n\
             --- END OF FILE: study/Chapter1.md ---\n\n"
        );
    }

    #[test]
    fn test_no_notes_is_error_even_with_assets() {
        let bytes = build_zip(&[("img/a.png", b"png"), ("readme.txt", b"hi")]);
        let err = reader().extract("vault.zip", &bytes).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Archive(ArchiveError::NoTextContent)
        ));
    }

    #[test]
    fn test_undecodable_notes_are_skipped() {
        let bytes = build_zip(&[("bad.md", &[0xff, 0xfe, 0x00]), ("good.md", b"ok")]);
        let content = reader().extract("vault.zip", &bytes).unwrap();
        assert!(!content.markdown_content.contains("bad.md"));
        assert!(content.markdown_content.contains("--- START OF FILE: good.md ---"));
    }

    #[test]
    fn test_only_undecodable_notes_is_error() {
        let bytes = build_zip(&[("bad.md", &[0xc3, 0x28])]);
        assert!(reader().extract("vault.zip", &bytes).is_err());
    }

    #[test]
    fn test_order_follows_archive_and_is_stable() {
        let bytes = build_zip(&[("z.md", b"last letter"), ("a.md", b"first letter")]);
        let first = reader().extract("v.zip", &bytes).unwrap().markdown_content;
        let second = reader().extract("v.zip", &bytes).unwrap().markdown_content;
        assert_eq!(first, second);

        let z = first.find("START OF FILE: z.md").unwrap();
        let a = first.find("START OF FILE: a.md").unwrap();
        assert!(z < a);
    }

    #[test]
    fn test_truncation_appends_notice() {
        let long = "x".repeat(500);
        let bytes = build_zip(&[("long.md", long.as_bytes())]);
        let content = reader()
            .with_max_content_chars(100)
            .extract("v.zip", &bytes)
            .unwrap()
            .markdown_content;

        assert!(content.ends_with(TRUNCATION_NOTICE));
        assert_eq!(
            content.chars().count(),
            100 + TRUNCATION_NOTICE.chars().count()
        );
    }

    #[test]
    fn test_truncate_content_respects_char_boundaries() {
        let text = "日本語テキスト".to_string();
        let truncated = truncate_content(text, 3);
        assert_eq!(truncated, format!("日本語{}", TRUNCATION_NOTICE));

        let short = truncate_content("abc".to_string(), 3);
        assert_eq!(short, "abc");
    }

    #[test]
    fn test_asset_names_are_basenames_first_wins() {
        let bytes = build_zip(&[
            ("note.md", b"text"),
            ("images/sub/pic.png", b"first"),
            ("other/pic.png", b"second"),
            ("Logo.SVG", b"<svg/>"),
        ]);
        let content = reader().extract("v.zip", &bytes).unwrap();

        assert_eq!(content.asset_names(), vec!["pic.png", "Logo.SVG"]);
        assert_eq!(content.assets[0].data, b"first".to_vec());
    }

    #[test]
    fn test_huge_declared_size_does_not_abort_extraction() {
        let bytes = stored_zip(&[
            ("note.md", b"# Note", None),
            ("img/pic.png", b"png", Some(1 << 62)),
        ]);

        let content = reader().extract("v.zip", &bytes).unwrap();

        assert!(content.markdown_content.contains("# Note"));
        // 条目要么按真实内容读出，要么被跳过
        assert!(content.assets.iter().all(|asset| asset.data == b"png".to_vec()));
    }

    #[test]
    fn test_hand_built_archive_reads_like_written_one() {
        let bytes = stored_zip(&[("a.md", b"alpha", None), ("b.png", b"img", None)]);
        let content = reader().extract("v.zip", &bytes).unwrap();

        assert!(content.markdown_content.contains("alpha"));
        assert_eq!(content.asset_names(), vec!["b.png"]);
    }

    #[test]
    fn test_corrupt_archive_is_read_error() {
        let err = reader().extract("v.zip", b"PK\x03\x04 broken").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Archive(ArchiveError::ReadFailed { .. })
        ));
    }
}
