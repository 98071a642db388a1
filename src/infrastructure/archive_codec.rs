//! 压缩包编解码器 - 基础设施层
//!
//! 只暴露"列出条目 / 读取条目 / 写出压缩包"的能力，不认识笔记和资源

use std::io::{Cursor, Read, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;

/// 读取条目时预分配的上限，条目头里声明的大小不可信
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// 已打开的压缩包
pub trait ArchiveReader {
    /// 所有非目录条目的完整路径，按压缩包的枚举顺序排列
    fn file_names(&self) -> &[String];

    /// 读取 `file_names()[index]` 的原始字节
    fn read(&mut self, index: usize) -> Result<Vec<u8>, ArchiveError>;
}

/// 压缩包编解码能力
pub trait ArchiveCodec: Send + Sync {
    /// 在内存中打开压缩包
    fn open<'a>(&self, bytes: &'a [u8]) -> Result<Box<dyn ArchiveReader + 'a>, ArchiveError>;

    /// 把 (路径, 内容) 列表按顺序写成一个新的压缩包
    fn write(&self, files: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ArchiveError>;
}

/// 基于 `zip` crate 的编解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ZipCodec {
    pub fn new() -> Self {
        Self
    }
}

struct ZipReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    /// (中央目录索引, 完整路径)
    entries: Vec<(usize, String)>,
    names: Vec<String>,
}

impl ArchiveReader for ZipReader<'_> {
    fn file_names(&self) -> &[String] {
        &self.names
    }

    fn read(&mut self, index: usize) -> Result<Vec<u8>, ArchiveError> {
        let (zip_index, name) = self.entries.get(index).cloned().ok_or_else(|| {
            ArchiveError::EntryReadFailed {
                name: format!("#{}", index),
                message: "条目索引超出范围".to_string(),
            }
        })?;

        let mut file = self
            .archive
            .by_index(zip_index)
            .map_err(|e| ArchiveError::EntryReadFailed {
                name: name.clone(),
                message: e.to_string(),
            })?;

        let mut data = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
        file.read_to_end(&mut data)
            .map_err(|e| ArchiveError::EntryReadFailed {
                name,
                message: e.to_string(),
            })?;
        Ok(data)
    }
}

impl ArchiveCodec for ZipCodec {
    fn open<'a>(&self, bytes: &'a [u8]) -> Result<Box<dyn ArchiveReader + 'a>, ArchiveError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|source| ArchiveError::ReadFailed { source })?;

        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|source| ArchiveError::ReadFailed { source })?;
            if entry.is_dir() {
                continue;
            }
            entries.push((i, entry.name().to_string()));
        }
        let names = entries.iter().map(|(_, name)| name.clone()).collect();

        Ok(Box::new(ZipReader {
            archive,
            entries,
            names,
        }))
    }

    fn write(&self, files: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ArchiveError> {
        let write_failed = |source: ZipError| ArchiveError::WriteFailed { source };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in files {
            writer
                .start_file(name.as_str(), options)
                .map_err(write_failed)?;
            writer
                .write_all(data)
                .map_err(|e| write_failed(ZipError::Io(e)))?;
        }

        let cursor = writer.finish().map_err(write_failed)?;
        Ok(cursor.into_inner())
    }
}
