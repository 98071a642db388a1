//! 输出打包服务 - 业务能力层
//!
//! 把生成结果写成可下载的压缩包，并为网站生成内联图片的预览页

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{NoExpand, Regex};
use tracing::{debug, warn};

use crate::error::ArchiveError;
use crate::infrastructure::ArchiveCodec;
use crate::models::output::{ASSETS_DIR, INDEX_HTML};
use crate::models::{ExtractedAsset, GenerationResult, ScormFiles};
use crate::services::file_kind;

/// 输出打包服务
#[derive(Clone)]
pub struct Packager {
    codec: Arc<dyn ArchiveCodec>,
}

impl Packager {
    pub fn new(codec: Arc<dyn ArchiveCodec>) -> Self {
        Self { codec }
    }

    /// 按生成结果打包；资源只用于网站任务
    pub fn package(
        &self,
        result: &GenerationResult,
        assets: &[ExtractedAsset],
    ) -> Result<Vec<u8>, ArchiveError> {
        match result {
            GenerationResult::Website(html) => self.package_website(html, assets),
            GenerationResult::Scorm(files) => self.package_scorm(files),
        }
    }

    /// 网站包：`index.html` + `assets/<文件名>`
    pub fn package_website(
        &self,
        html: &str,
        assets: &[ExtractedAsset],
    ) -> Result<Vec<u8>, ArchiveError> {
        let mut files = Vec::with_capacity(assets.len() + 1);
        files.push((INDEX_HTML.to_string(), html.as_bytes().to_vec()));
        for asset in assets {
            files.push((asset_path(&asset.name), asset.data.clone()));
        }

        debug!("打包网站: 1 个页面, {} 个资源", assets.len());
        self.codec.write(&files)
    }

    /// SCORM 包：固定文件名的两个或三个文件
    pub fn package_scorm(&self, scorm: &ScormFiles) -> Result<Vec<u8>, ArchiveError> {
        let files: Vec<(String, Vec<u8>)> = scorm
            .entries()
            .into_iter()
            .map(|(name, content)| (name.to_string(), content.as_bytes().to_vec()))
            .collect();

        debug!("打包 SCORM: {} 个文件", files.len());
        self.codec.write(&files)
    }
}

/// 资源在网站包中的相对路径
pub fn asset_path(name: &str) -> String {
    format!("{}/{}", ASSETS_DIR, name)
}

/// 资源的 data URI
pub fn data_uri(asset: &ExtractedAsset) -> String {
    format!(
        "data:{};base64,{}",
        file_kind::mime_type(&asset.name),
        STANDARD.encode(&asset.data)
    )
}

/// 生成预览页
///
/// 把 `src="assets/<name>"`（或单引号形式）替换为 data URI。
/// 返回新字符串，打包用的文档保持相对路径不变
pub fn render_preview(html: &str, assets: &[ExtractedAsset]) -> String {
    let mut preview = html.to_string();

    for asset in assets {
        let path = regex::escape(&asset_path(&asset.name));
        let pattern = format!(r#"src="{path}"|src='{path}'"#);
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!("⚠️ 无法为资源 {} 生成预览: {}", asset.name, e);
                continue;
            }
        };

        let replacement = format!(r#"src="{}""#, data_uri(asset));
        preview = re
            .replace_all(&preview, NoExpand(&replacement))
            .into_owned();
    }

    preview
}
