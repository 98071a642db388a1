//! Prompt 构建 - 业务能力层
//!
//! 纯函数：相同输入永远得到相同的 prompt，没有副作用

use crate::models::output::{API_WRAPPER_JS, ASSETS_DIR, INDEX_HTML, MANIFEST_XML};
use crate::models::{GenerationRequest, GenerationTask};

/// 网站输出必须以此开头
pub const DOCTYPE: &str = "<!DOCTYPE html>";

/// 网站输出必须以此结尾
pub const CLOSING_TAG: &str = "</html>";

/// 按任务构建 prompt
pub fn build_prompt(request: &GenerationRequest) -> String {
    match request.task {
        GenerationTask::Website => build_website_prompt(
            &request.source_file_name,
            &request.extracted_text,
            &request.asset_names,
        ),
        GenerationTask::Scorm => {
            build_scorm_prompt(&request.source_file_name, &request.extracted_text)
        }
    }
}

/// 从压缩包文件名推导课程主题
///
/// 去掉 `.zip` 后缀，`_` 和 `-` 视为空格
pub fn derive_topic(file_name: &str) -> String {
    let stem = strip_zip_extension(file_name);
    let topic = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if topic.is_empty() {
        "Course".to_string()
    } else {
        topic
    }
}

/// 去掉末尾的 `.zip`（不区分大小写）
pub fn strip_zip_extension(file_name: &str) -> &str {
    let len = file_name.len();
    if len >= 4
        && file_name.is_char_boundary(len - 4)
        && file_name[len - 4..].eq_ignore_ascii_case(".zip")
    {
        &file_name[..len - 4]
    } else {
        file_name
    }
}

fn assets_clause(asset_names: &[String]) -> String {
    let Some(first) = asset_names.first() else {
        return "No image assets were provided. Do not include any <img> tags unless you are \
                using placeholder images from a service like unsplash."
            .to_string();
    };

    format!(
        r#"**Available Image Assets:**
The user has provided the following image assets: {names}.
You should incorporate these images into the generated website where it makes sense to enhance the content.
When you use an image, you MUST reference it using a relative path prefixed with '{dir}/'.
For example: <img src="{dir}/{first}" alt="Descriptive text">
Do NOT use any other paths for images."#,
        names = asset_names.join(", "),
        dir = ASSETS_DIR,
        first = first,
    )
}

/// 网站生成 prompt
pub fn build_website_prompt(file_name: &str, notes: &str, asset_names: &[String]) -> String {
    format!(
        r#"You are an expert front-end developer specializing in creating beautiful, interactive, and self-contained websites with Tailwind CSS and vanilla JavaScript.

An Obsidian vault zip file named "{file_name}" has been uploaded. The user wants to convert this into a multi-page interactive website. The notes contain file paths (e.g., "study/Chapter1.md") which you should use to inform the site structure.

Here is the combined content of all the markdown files from the user's notes:
---
{notes}
---

{assets}

Your task is to generate a **complete, single, self-contained '{index}' file** that simulates a multi-page experience **based on the provided notes**.

**Core Requirements:**
1. **Content Relevance:** All generated content (page titles, text, quiz questions, images) MUST be directly based on the provided notes content and available assets. Do not make up information.
2. **Single File Output:** The entire website (HTML, CSS, JS) must be in one single '{index}' file. The final product will be zipped up with an '{dir}' folder, but your output should ONLY be the HTML file.
3. **Tailwind CSS:** Use the Tailwind CSS CDN with the typography plugin included. Add `<script src="https://cdn.tailwindcss.com?plugins=typography"></script>` to the `<head>`.
4. **Multi-Page Simulation with JavaScript:**
   * Create a structure with a persistent sidebar for navigation and a main content area.
   * Build the sidebar navigation from the file paths in the "START OF FILE" markers. Represent subdirectories as nested menus or sidebar headings so the vault's folder structure is visible.
   * Each "page" must be a `<div class="page-content" id="page-name" style="display: none;"> ... </div>` inside this one document.
   * The "Home" page must be visible by default (`style="display: block;"`).
   * Navigation must never load another document. Clicking a sidebar link hides every `.page-content` div and shows only the one named by the link's `data-page` attribute.
5. **Structure and Features:**
   * **Sidebar Navigation:** Links to "Home", the pages derived from the notes, and a "Quiz".
   * **Breadcrumbs:** A breadcrumb trail at the top of the main content area, updated by JavaScript.
   * **Home Page:** A hero section introducing the main topic of the notes.
   * **Notes Pages:** Distinct pages summarizing the key information from the notes, using headings, paragraphs and lists. If assets are available, display them here.
   * **Interactive Quiz Page:** A multiple-choice quiz with at least 4 questions whose answers can be found in the notes, a "Submit Quiz" button, and a script that checks the answers and displays the score.
6. **Aesthetics & UX:**
   * A modern, clean dark-mode design with a professional color palette.
   * Wrap the rendered notes of every `.page-content` div in a container with the Tailwind classes `prose prose-invert max-w-none`.
   * Fully responsive layout; the sidebar collapses into an overlay on mobile.
   * Smooth transitions, hover effects and a readable modern font from Google Fonts.
7. **Output Format:** Provide ONLY the raw HTML code. Do not wrap it in markdown backticks or add any explanation. The response must start with `{doctype}` and end with `{closing}`."#,
        file_name = file_name,
        notes = notes,
        assets = assets_clause(asset_names),
        index = INDEX_HTML,
        dir = ASSETS_DIR,
        doctype = DOCTYPE,
        closing = CLOSING_TAG,
    )
}

/// SCORM 1.2 课件包生成 prompt
pub fn build_scorm_prompt(file_name: &str, notes: &str) -> String {
    let topic = derive_topic(file_name);

    format!(
        r#"You are an expert in instructional design and e-learning development, specializing in SCORM 1.2.
Your task is to create a complete, self-contained SCORM 1.2 package from the provided markdown notes.
The topic of the notes is "{topic}".

Here is the content of the notes:
---
{notes}
---

Generate a JSON object containing three files as strings: '{manifest}', '{index}', and '{wrapper}'.

**Instructions for '{index}':**
1. It must be a single, self-contained HTML file.
2. Use the Tailwind CSS CDN: <script src="https://cdn.tailwindcss.com"></script>.
3. Create a clean, professional and responsive learning module layout with a dark theme.
4. The content must be based entirely on the provided notes. Summarize the key points into logical sections.
5. Include a simple multiple-choice quiz (2-3 questions) based on the notes.
6. The page must include a "Mark as Complete" button.
7. Include a <script> tag that references "./{wrapper}".
8. Write JavaScript within the HTML file to:
   - Initialize the SCORM connection on page load using the wrapper.
   - When "Mark as Complete" is clicked, set 'cmi.core.lesson_status' to 'completed' through the wrapper.
   - Give visual feedback when the button is clicked (disable the button, show a message).
   - Terminate the SCORM connection when the window is closed.

**CRITICAL Instructions for '{manifest}':**
1. Create a valid SCORM 1.2 manifest file.
2. The root <manifest> element must declare exactly these namespaces and schema locations:
   ```xml
   <manifest identifier="com.scorm.pack" version="1.2"
             xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
             xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2"
             xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
             xsi:schemaLocation="http://www.imsproject.org/xsd/imscp_rootv1p1p2 imscp_rootv1p1p2.xsd http://www.adlnet.org/xsd/adlcp_rootv1p2 adlcp_rootv1p2.xsd">
   ```
3. The <organization> identifier must be "org-1" and its <title> must be "{topic}".
4. The <item> identifier must be "item-1", it must reference the resource, and its <title> must be "{topic}".
5. The <resources> section must contain exactly one <resource> element.
6. The <resource> element must have type "webcontent", adlcp:scormtype "sco", and href "{index}".
7. The <resource> element MUST list EVERY file in the package with <file> tags, including '{index}' AND '{wrapper}':
   ```xml
   <resource ...>
     <file href="{index}" />
     <file href="{wrapper}" />
   </resource>
   ```

**Instructions for '{wrapper}':**
1. Provide a basic, robust SCORM 1.2 API wrapper.
2. It should safely find the SCORM API object in parent windows.
3. Implement functions for initialization, termination, getting values and setting values.
4. Include clear comments explaining the code.

The final output must be a single, valid JSON object with exactly the keys '{index}', '{manifest}' and '{wrapper}', and nothing else."#,
        topic = topic,
        notes = notes,
        index = INDEX_HTML,
        manifest = MANIFEST_XML,
        wrapper = API_WRAPPER_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(task: GenerationTask, assets: &[&str]) -> GenerationRequest {
        GenerationRequest {
            source_file_name: "Quantum_Physics.zip".to_string(),
            extracted_text: "--- START OF FILE: study/Chapter1.md ---\n\nPhotons\n\n".to_string(),
            asset_names: assets.iter().map(|s| s.to_string()).collect(),
            task,
        }
    }

    #[test]
    fn test_derive_topic() {
        assert_eq!(derive_topic("Quantum_Physics.zip"), "Quantum Physics");
        assert_eq!(derive_topic("my-notes_v2.ZIP"), "my notes v2");
        assert_eq!(derive_topic("plain"), "plain");
        assert_eq!(derive_topic(".zip"), "Course");
    }

    #[test]
    fn test_website_prompt_embeds_inputs_and_constraints() {
        let prompt = build_prompt(&request(GenerationTask::Website, &["logo.png", "diagram.svg"]));

        assert!(prompt.contains("\"Quantum_Physics.zip\""));
        assert!(prompt.contains("--- START OF FILE: study/Chapter1.md ---"));
        assert!(prompt.contains("logo.png, diagram.svg"));
        assert!(prompt.contains("<img src=\"assets/logo.png\""));
        assert!(prompt.contains("at least 4 questions"));
        assert!(prompt.contains("data-page"));
        assert!(prompt.contains("start with `<!DOCTYPE html>` and end with `</html>`"));
    }

    #[test]
    fn test_website_prompt_without_assets() {
        let prompt = build_prompt(&request(GenerationTask::Website, &[]));
        assert!(prompt.contains("No image assets were provided"));
        assert!(!prompt.contains("Available Image Assets"));
    }

    #[test]
    fn test_scorm_prompt_contract() {
        let prompt = build_prompt(&request(GenerationTask::Scorm, &["ignored.png"]));

        assert!(prompt.contains("The topic of the notes is \"Quantum Physics\"."));
        assert!(prompt.contains("xmlns=\"http://www.imsproject.org/xsd/imscp_rootv1p1p2\""));
        assert!(prompt.contains("identifier must be \"org-1\" and its <title> must be \"Quantum Physics\""));
        assert!(prompt.contains("\"item-1\""));
        assert!(prompt.contains("<file href=\"index.html\" />"));
        assert!(prompt.contains("<file href=\"scorm_api_wrapper.js\" />"));
        assert!(!prompt.contains("ignored.png"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let req = request(GenerationTask::Website, &["a.png"]);
        assert_eq!(build_prompt(&req), build_prompt(&req));
    }
}
