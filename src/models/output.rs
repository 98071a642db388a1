/// 网站 / SCORM 包中的页面文件名
pub const INDEX_HTML: &str = "index.html";
/// SCORM 清单文件名
pub const MANIFEST_XML: &str = "imsmanifest.xml";
/// SCORM API 封装脚本文件名
pub const API_WRAPPER_JS: &str = "scorm_api_wrapper.js";
/// 网站包中的图片目录
pub const ASSETS_DIR: &str = "assets";

/// SCORM 包的三个文件
///
/// 包内文件名见 `entries()`，是 LMS 约定的名字，不能修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScormFiles {
    pub index_html: String,
    pub imsmanifest_xml: String,
    pub scorm_api_wrapper_js: Option<String>,
}

impl ScormFiles {
    /// 按包内文件名列出 (文件名, 内容)
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![
            (INDEX_HTML, self.index_html.as_str()),
            (MANIFEST_XML, self.imsmanifest_xml.as_str()),
        ];
        if let Some(wrapper) = &self.scorm_api_wrapper_js {
            entries.push((API_WRAPPER_JS, wrapper.as_str()));
        }
        entries
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// 单个 HTML 文档
    Website(String),
    Scorm(ScormFiles),
}
