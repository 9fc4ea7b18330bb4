// src/extractors/project.rs
//
// Extraction profiles for the site-builder model prompts: which marker pairs
// a given kind of model response is expected to carry, and the per-file
// compatibility fixups applied to extracted project files.

// --- Imports ---
use crate::extractors::blocks::{extract_blocks, strip_code_fence, ExtractionSpec};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

// --- Extraction Specs (Lazy Static) ---

/// Full Next.js project response: fifteen marker pairs, one per project file.
pub static NEXTJS_PROJECT_SPEC: Lazy<ExtractionSpec> = Lazy::new(|| {
    ExtractionSpec::new()
        .entry("package.json", "PACKAGE_JSON_START", "PACKAGE_JSON_END")
        .entry("tsconfig.json", "TSCONFIG_START", "TSCONFIG_END")
        .entry("tailwind.config.js", "TAILWIND_CONFIG_START", "TAILWIND_CONFIG_END")
        .entry("next.config.js", "NEXT_CONFIG_START", "NEXT_CONFIG_END")
        .entry("app/layout.tsx", "LAYOUT_TSX_START", "LAYOUT_TSX_END")
        .entry("app/page.tsx", "PAGE_TSX_START", "PAGE_TSX_END")
        .entry("app/globals.css", "GLOBALS_CSS_START", "GLOBALS_CSS_END")
        .entry("components/Hero.tsx", "HERO_COMPONENT_START", "HERO_COMPONENT_END")
        .entry("components/Features.tsx", "FEATURES_COMPONENT_START", "FEATURES_COMPONENT_END")
        .entry("components/Footer.tsx", "FOOTER_COMPONENT_START", "FOOTER_COMPONENT_END")
        .entry("components/Button.tsx", "BUTTON_COMPONENT_START", "BUTTON_COMPONENT_END")
        .entry("components/Card.tsx", "CARD_COMPONENT_START", "CARD_COMPONENT_END")
        .entry("components/Container.tsx", "CONTAINER_COMPONENT_START", "CONTAINER_COMPONENT_END")
        .entry("components/Modal.tsx", "MODAL_COMPONENT_START", "MODAL_COMPONENT_END")
        .entry("components/Form.tsx", "FORM_COMPONENT_START", "FORM_COMPONENT_END")
});

/// Single generated page plus its title. The page is the primary payload:
/// when the markers are missing, the first ```html fenced block is used.
pub static SINGLE_PAGE_SPEC: Lazy<ExtractionSpec> = Lazy::new(|| {
    ExtractionSpec::new()
        .entry("index.html", "NEW_PAGE_START", "NEW_PAGE_END")
        .entry("title.txt", "TITLE_PAGE_START", "TITLE_PAGE_END")
        .primary_fallback("index.html", "html")
});

/// Element-edit response: updated page HTML plus the assistant's commentary.
pub static PAGE_EDIT_SPEC: Lazy<ExtractionSpec> = Lazy::new(|| {
    ExtractionSpec::new()
        .entry("index.html", "HTML_START", "HTML_END")
        .entry("response.txt", "RESPONSE_START", "RESPONSE_END")
        .primary_fallback("index.html", "html")
});

// --- Project Extraction ---

/// Extracts a full Next.js project from a model response: marker blocks per
/// [`NEXTJS_PROJECT_SPEC`], markdown fences stripped, compatibility fixups
/// applied. Keys are relative output paths.
pub fn extract_project(source: &str) -> BTreeMap<String, String> {
    extract_blocks(source, &NEXTJS_PROJECT_SPEC)
        .into_iter()
        .map(|(name, file)| {
            let content = apply_compat_fixups(&name, strip_code_fence(&file.content));
            (name, content)
        })
        .collect()
}

/// Extracts a page-shaped response (single page or edit profile), stripping
/// stray fences from each block.
pub fn extract_page(source: &str, spec: &ExtractionSpec) -> BTreeMap<String, String> {
    extract_blocks(source, spec)
        .into_iter()
        .map(|(name, file)| (name, strip_code_fence(&file.content)))
        .collect()
}

/// Per-file rewrites that keep generated projects buildable: models keep
/// emitting stale dependency versions and wrong relative imports.
pub fn apply_compat_fixups(name: &str, content: String) -> String {
    match name {
        "next.config.js" => {
            // App Router needs the experimental flag on the Next version we pin.
            if !content.contains("experimental") {
                content.replace(
                    "module.exports = {",
                    "module.exports = {\n  experimental: {\n    appDir: true\n  },",
                )
            } else {
                content
            }
        }
        "package.json" => content
            .replace("\"framer-motion\": \"^6.0.0\"", "\"framer-motion\": \"^10.16.16\"")
            .replace("\"react\": \"latest\"", "\"react\": \"^18.2.0\"")
            .replace("\"react-dom\": \"latest\"", "\"react-dom\": \"^18.2.0\"")
            .replace("\"next\": \"latest\"", "\"next\": \"^14.0.0\"")
            .replace("\"tailwindcss\": \"^3.0.0\"", "\"tailwindcss\": \"^3.3.0\""),
        "app/layout.tsx" => content.replace("import '../globals.css';", "import './globals.css';"),
        "app/page.tsx" => content
            .replace("from './components/", "from '../components/")
            .replace("import Layout from './layout';", "")
            .replace("import Layout from '../layout';", "")
            .replace("import Layout from './layout'", "")
            // The import is gone, so the wrapper must become a fragment.
            .replace("<Layout>", "<>")
            .replace("</Layout>", "</>"),
        _ => content,
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_project_files_from_model_response() {
        let source = "\
Вот проект:

PACKAGE_JSON_START
```json
{ \"name\": \"demo\", \"dependencies\": { \"react\": \"latest\" } }
```
PACKAGE_JSON_END

PAGE_TSX_START
```tsx
import Hero from './components/Hero';
export default function Page() { return <Hero />; }
```
PAGE_TSX_END

Готово!";
        let files = extract_project(source);

        assert_eq!(files.len(), 2);
        // Fence stripped, react version pinned.
        assert_eq!(
            files["package.json"],
            "{ \"name\": \"demo\", \"dependencies\": { \"react\": \"^18.2.0\" } }"
        );
        // Component import rewritten to the project layout.
        assert!(files["app/page.tsx"].contains("from '../components/Hero'"));
        assert!(!files["app/page.tsx"].contains("```"));
    }

    #[test]
    fn missing_markers_are_simply_absent() {
        let files = extract_project("PACKAGE_JSON_START{}PACKAGE_JSON_END");

        assert_eq!(files.len(), 1);
        assert!(!files.contains_key("app/page.tsx"));
    }

    #[test]
    fn next_config_gains_app_dir_flag() {
        let fixed = apply_compat_fixups(
            "next.config.js",
            "module.exports = {\n  reactStrictMode: true\n}".to_string(),
        );

        assert!(fixed.contains("appDir: true"));
    }

    #[test]
    fn next_config_with_experimental_is_untouched() {
        let original = "module.exports = {\n  experimental: { appDir: true }\n}".to_string();
        assert_eq!(apply_compat_fixups("next.config.js", original.clone()), original);
    }

    #[test]
    fn layout_globals_import_is_rewritten() {
        let fixed = apply_compat_fixups(
            "app/layout.tsx",
            "import '../globals.css';\nexport default Layout;".to_string(),
        );

        assert!(fixed.starts_with("import './globals.css';"));
    }

    #[test]
    fn page_tsx_layout_import_is_dropped() {
        let fixed = apply_compat_fixups(
            "app/page.tsx",
            "import Layout from './layout';\nimport Hero from './components/Hero';".to_string(),
        );

        assert!(!fixed.contains("import Layout"));
        assert!(fixed.contains("from '../components/Hero'"));
    }

    #[test]
    fn page_tsx_layout_wrapper_becomes_fragment() {
        let fixed = apply_compat_fixups(
            "app/page.tsx",
            "import Layout from './layout'\nexport default function Page() {\n  return <Layout><Hero /></Layout>;\n}".to_string(),
        );

        assert!(!fixed.contains("Layout"));
        assert!(fixed.contains("return <><Hero /></>;"));
    }

    #[test]
    fn edit_profile_extracts_html_and_commentary() {
        let source = "HTML_START\n<div>updated</div>\nHTML_END\n\nRESPONSE_START\nКнопка перекрашена.\nRESPONSE_END";
        let files = extract_page(source, &PAGE_EDIT_SPEC);

        assert_eq!(files["index.html"], "<div>updated</div>");
        assert_eq!(files["response.txt"], "Кнопка перекрашена.");
    }

    #[test]
    fn single_page_profile_uses_fenced_fallback() {
        let source = "Сделал страницу:\n```html\n<!DOCTYPE html><html></html>\n```";
        let files = extract_page(source, &SINGLE_PAGE_SPEC);

        assert_eq!(files["index.html"], "<!DOCTYPE html><html></html>");
        assert!(!files.contains_key("title.txt"));
    }
}
