//! 基础设施层
//!
//! 持有稀缺资源（压缩包编解码器、生成后端），只暴露能力。
//! 上层通过 trait 依赖这些能力，测试时可以替换为确定性的实现。

pub mod archive_codec;
pub mod text_generator;

pub use archive_codec::{ArchiveCodec, ArchiveReader, ZipCodec};
pub use text_generator::{ResponseShape, TextGenerator};
