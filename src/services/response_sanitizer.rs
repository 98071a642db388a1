//! 响应清洗 - 业务能力层
//!
//! 从生成后端返回的原始文本中取出真正需要的内容

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::models::output::{API_WRAPPER_JS, INDEX_HTML, MANIFEST_XML};
use crate::models::ScormFiles;
use crate::services::prompt_builder::DOCTYPE;
use crate::utils::logging::truncate_text;

static HTML_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```html\s*(.*?)\s*```").expect("html fence regex"));

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("json fence regex"));

/// 取出 HTML 文档
///
/// 1. 有 ```html 代码块时只取块内内容
/// 2. 去掉首尾空白
/// 3. 以 `<!DOCTYPE html>` 开头则直接返回
/// 4. 否则从第一次出现 `<!DOCTYPE html>` 的位置截取
/// 5. 找不到时返回 `GenerationError::InvalidOutput`
pub fn sanitize_html(raw: &str) -> Result<String, GenerationError> {
    let fenced = HTML_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|inner| !inner.is_empty());

    let text = fenced.unwrap_or(raw).trim();

    if text.starts_with(DOCTYPE) {
        return Ok(text.to_string());
    }

    match text.find(DOCTYPE) {
        Some(index) => {
            debug!("响应前有 {} 字节多余内容，已丢弃", index);
            Ok(text[index..].to_string())
        }
        None => {
            warn!(
                "清洗后的响应不包含 {}: {}",
                DOCTYPE,
                truncate_text(text, 200)
            );
            Err(GenerationError::InvalidOutput)
        }
    }
}

/// 解析 SCORM 结构化响应
///
/// `index.html` 和 `imsmanifest.xml` 必须存在且非空；
/// `scorm_api_wrapper.js` 只有非空时才保留
pub fn sanitize_scorm(raw: &str) -> Result<ScormFiles, GenerationError> {
    let trimmed = raw.trim();
    let payload = JSON_FENCE
        .captures(trimmed)
        .filter(|_| !trimmed.starts_with('{'))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    let object = match serde_json::from_str::<JsonValue>(payload) {
        Ok(JsonValue::Object(map)) => map,
        Ok(other) => {
            warn!("SCORM 响应不是 JSON 对象: {}", truncate_text(&other.to_string(), 200));
            Map::new()
        }
        Err(e) => {
            warn!("SCORM 响应 JSON 解析失败: {}", e);
            Map::new()
        }
    };

    let index_html = non_empty_field(&object, INDEX_HTML);
    let imsmanifest_xml = non_empty_field(&object, MANIFEST_XML);

    let missing: Vec<&str> = [
        (INDEX_HTML, index_html.is_none()),
        (MANIFEST_XML, imsmanifest_xml.is_none()),
    ]
    .into_iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| name)
    .collect();

    match (index_html, imsmanifest_xml) {
        (Some(index_html), Some(imsmanifest_xml)) => Ok(ScormFiles {
            index_html,
            imsmanifest_xml,
            scorm_api_wrapper_js: non_empty_field(&object, API_WRAPPER_JS),
        }),
        _ => Err(GenerationError::IncompleteOutput {
            missing: missing.join(", "),
        }),
    }
}

fn non_empty_field(object: &Map<String, JsonValue>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_html_is_unwrapped() {
        let raw = "```html\n<!DOCTYPE html><html><body>Hi</body></html>\n```";
        assert_eq!(
            sanitize_html(raw).unwrap(),
            "<!DOCTYPE html><html><body>Hi</body></html>"
        );
    }

    #[test]
    fn test_plain_html_is_trimmed() {
        let raw = "\n\n  <!DOCTYPE html><html></html>  \n";
        assert_eq!(sanitize_html(raw).unwrap(), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn test_leading_commentary_is_dropped() {
        let raw = "Sure! Here is your website:\n<!DOCTYPE html><html></html>";
        assert_eq!(sanitize_html(raw).unwrap(), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn test_missing_doctype_is_invalid() {
        let err = sanitize_html("<html><body>no declaration</body></html>").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutput));

        let err = sanitize_html("```html\n<div></div>\n```").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutput));
    }

    #[test]
    fn test_scorm_with_all_fields() {
        let raw = json!({
            "index.html": "<!DOCTYPE html><html></html>",
            "imsmanifest.xml": "<manifest/>",
            "scorm_api_wrapper.js": "var API = null;"
        })
        .to_string();

        let files = sanitize_scorm(&raw).unwrap();
        assert_eq!(files.index_html, "<!DOCTYPE html><html></html>");
        assert_eq!(files.imsmanifest_xml, "<manifest/>");
        assert_eq!(files.scorm_api_wrapper_js.as_deref(), Some("var API = null;"));
    }

    #[test]
    fn test_scorm_missing_manifest_is_incomplete() {
        let raw = json!({ "index.html": "<!DOCTYPE html>" }).to_string();
        match sanitize_scorm(&raw).unwrap_err() {
            GenerationError::IncompleteOutput { missing } => assert_eq!(missing, "imsmanifest.xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scorm_empty_required_field_is_incomplete() {
        let raw = json!({ "index.html": "  ", "imsmanifest.xml": "<manifest/>" }).to_string();
        assert!(matches!(
            sanitize_scorm(&raw),
            Err(GenerationError::IncompleteOutput { .. })
        ));
    }

    #[test]
    fn test_scorm_empty_wrapper_is_dropped() {
        let raw = json!({
            "index.html": "<!DOCTYPE html>",
            "imsmanifest.xml": "<manifest/>",
            "scorm_api_wrapper.js": ""
        })
        .to_string();
        assert_eq!(sanitize_scorm(&raw).unwrap().scorm_api_wrapper_js, None);
    }

    #[test]
    fn test_scorm_fenced_json_is_accepted() {
        let raw = "```json\n{\"index.html\": \"a\", \"imsmanifest.xml\": \"b\"}\n```";
        let files = sanitize_scorm(raw).unwrap();
        assert_eq!(files.index_html, "a");
    }

    #[test]
    fn test_scorm_garbage_is_incomplete() {
        match sanitize_scorm("not json at all").unwrap_err() {
            GenerationError::IncompleteOutput { missing } => {
                assert_eq!(missing, "index.html, imsmanifest.xml")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
