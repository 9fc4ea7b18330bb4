// src/extractors/blocks.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// --- Regex Patterns (Lazy Static) ---
// A leading markdown fence line like ```json or ```tsx at the start of an
// extracted block, and the closing ``` at the end. Models wrap file contents
// in fences despite being told not to.
static FENCE_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[A-Za-z0-9+#-]*[ \t]*\r?\n?")
        .expect("Failed to compile FENCE_OPEN_RE")
});

static FENCE_CLOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*```\s*$").expect("Failed to compile FENCE_CLOSE_RE")
});

// --- Data Structures ---

/// One `(logical_name, start_token, end_token)` triple of an extraction spec.
#[derive(Debug, Clone)]
pub struct SpecEntry {
    pub name: String,
    pub start_token: String,
    pub end_token: String,
}

/// Designates one spec entry as the primary payload: when its markers are
/// absent from the source, the first fenced code block with the given
/// language tag is used instead. Auxiliary entries never fall back.
#[derive(Debug, Clone)]
struct PrimaryFallback {
    name: String,
    fence_tag: String,
}

/// An ordered list of marker triples to look for in a model response.
/// Constructed once as static configuration and never mutated afterwards.
/// A logical name may appear at most once; duplicate pushes are ignored.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSpec {
    entries: Vec<SpecEntry>,
    primary: Option<PrimaryFallback>,
}

impl ExtractionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker triple. A duplicate logical name is dropped with a
    /// warning rather than shadowing the earlier entry.
    pub fn entry(mut self, name: &str, start_token: &str, end_token: &str) -> Self {
        if self.entries.iter().any(|e| e.name == name) {
            tracing::warn!("Duplicate logical name '{}' in extraction spec, ignoring", name);
            return self;
        }
        self.entries.push(SpecEntry {
            name: name.to_string(),
            start_token: start_token.to_string(),
            end_token: end_token.to_string(),
        });
        self
    }

    /// Marks `name` as the primary payload with a fenced-code fallback for
    /// the given language tag (e.g. "html").
    pub fn primary_fallback(mut self, name: &str, fence_tag: &str) -> Self {
        self.primary = Some(PrimaryFallback {
            name: name.to_string(),
            fence_tag: fence_tag.to_string(),
        });
        self
    }

    pub fn entries(&self) -> &[SpecEntry] {
        &self.entries
    }
}

/// Content found between one matched marker pair, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub name: String,
    pub content: String,
}

// --- Extraction ---

/// Extracts every marker-delimited block described by `spec` from `source`.
///
/// For each entry the first occurrence of the start token is located, then
/// the first occurrence of the end token strictly after it; the substring
/// between them is trimmed and recorded. An entry whose tokens are not both
/// present in start-before-end order is simply absent from the result: the
/// model did not produce that block this time, which is not an error.
///
/// Indexed substring search keeps matching linear in the source size; no
/// backtracking regex is involved. Total over any input, including empty.
pub fn extract_blocks(source: &str, spec: &ExtractionSpec) -> BTreeMap<String, ExtractedFile> {
    let mut found = BTreeMap::new();

    for entry in &spec.entries {
        match find_between(source, &entry.start_token, &entry.end_token) {
            Some(content) => {
                tracing::debug!("Found block '{}' ({} bytes)", entry.name, content.len());
                found.insert(
                    entry.name.clone(),
                    ExtractedFile {
                        name: entry.name.clone(),
                        content,
                    },
                );
            }
            None => {
                tracing::trace!("Markers for '{}' not present in source", entry.name);
            }
        }
    }

    // Fenced-code fallback, primary payload only.
    if let Some(primary) = &spec.primary {
        if !found.contains_key(&primary.name) {
            if let Some(content) = fenced_block(source, &primary.fence_tag) {
                tracing::debug!(
                    "Markers for primary '{}' absent, using ```{} fenced block ({} bytes)",
                    primary.name,
                    primary.fence_tag,
                    content.len()
                );
                found.insert(
                    primary.name.clone(),
                    ExtractedFile {
                        name: primary.name.clone(),
                        content,
                    },
                );
            }
        }
    }

    found
}

/// The trimmed substring strictly between the first `start` and the first
/// `end` occurring after it, if both are present.
fn find_between(source: &str, start: &str, end: &str) -> Option<String> {
    let start_idx = source.find(start)?;
    let content_start = start_idx + start.len();
    let rel_end = source[content_start..].find(end)?;
    Some(source[content_start..content_start + rel_end].trim().to_string())
}

/// Content of the first ```tag fenced code block in `source`, if any.
/// The opening fence must be ```tag (no other characters before the line
/// break); the block runs until the next ``` marker.
pub fn fenced_block(source: &str, tag: &str) -> Option<String> {
    let open = format!("```{}", tag);
    let open_idx = source.find(&open)?;
    let after_open = open_idx + open.len();
    // Skip to the end of the opening fence line.
    let content_start = match source[after_open..].find('\n') {
        Some(nl) => after_open + nl + 1,
        None => return None,
    };
    let rel_close = source[content_start..].find("```")?;
    Some(source[content_start..content_start + rel_close].trim().to_string())
}

/// Strips one leading markdown fence line (```json, ```tsx, bare ``` …) and
/// one trailing ``` from extracted content. Content without fences passes
/// through unchanged apart from trimming.
pub fn strip_code_fence(content: &str) -> String {
    let without_open = FENCE_OPEN_RE.replace(content, "");
    let without_close = FENCE_CLOSE_RE.replace(&without_open, "");
    without_close.trim().to_string()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn page_spec() -> ExtractionSpec {
        ExtractionSpec::new()
            .entry("index.html", "NEW_PAGE_START", "NEW_PAGE_END")
            .entry("title.txt", "TITLE_PAGE_START", "TITLE_PAGE_END")
            .primary_fallback("index.html", "html")
    }

    #[test]
    fn extracts_content_between_markers_exactly() {
        let source = "narrative NEW_PAGE_START<html></html>NEW_PAGE_END more narrative";
        let result = extract_blocks(source, &page_spec());

        assert_eq!(result["index.html"].content, "<html></html>");
        assert!(!result.contains_key("title.txt"));
    }

    #[test]
    fn trims_whitespace_around_content() {
        let source = "NEW_PAGE_START\n\n  <main>hi</main>  \nNEW_PAGE_END";
        let result = extract_blocks(source, &page_spec());

        assert_eq!(result["index.html"].content, "<main>hi</main>");
    }

    #[test]
    fn unpaired_start_token_yields_no_entry() {
        let source = "NEW_PAGE_START<html></html> and the model stopped here";
        let result = extract_blocks(source, &page_spec());

        assert!(result.is_empty());
    }

    #[test]
    fn end_before_start_yields_no_entry() {
        let source = "NEW_PAGE_END some text NEW_PAGE_START<html>";
        let result = extract_blocks(source, &page_spec());

        assert!(result.is_empty());
    }

    #[test]
    fn only_first_pair_is_honored() {
        let source = "NEW_PAGE_STARTfirstNEW_PAGE_END noise NEW_PAGE_STARTsecondNEW_PAGE_END";
        let result = extract_blocks(source, &page_spec());

        assert_eq!(result["index.html"].content, "first");
    }

    #[test]
    fn multiple_entries_extracted_independently() {
        let source = "TITLE_PAGE_STARTМой сайтTITLE_PAGE_END\nNEW_PAGE_START<p>ok</p>NEW_PAGE_END";
        let result = extract_blocks(source, &page_spec());

        assert_eq!(result["index.html"].content, "<p>ok</p>");
        assert_eq!(result["title.txt"].content, "Мой сайт");
    }

    #[test]
    fn empty_source_yields_empty_map() {
        assert!(extract_blocks("", &page_spec()).is_empty());
    }

    #[test]
    fn source_without_markers_yields_empty_map() {
        let source = "Вот описание сайта, но без кода.";
        assert!(extract_blocks(source, &page_spec()).is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let source = "a NEW_PAGE_START<div/>NEW_PAGE_END b TITLE_PAGE_STARTtTITLE_PAGE_END";
        let spec = page_spec();

        assert_eq!(extract_blocks(source, &spec), extract_blocks(source, &spec));
    }

    #[test]
    fn primary_falls_back_to_fenced_html_block() {
        let source = "Вот страница:\n```html\n<html><body>hi</body></html>\n```\nГотово.";
        let result = extract_blocks(source, &page_spec());

        assert_eq!(result["index.html"].content, "<html><body>hi</body></html>");
    }

    #[test]
    fn auxiliary_entries_never_fall_back() {
        // A fenced block exists but TITLE markers are absent; only the
        // primary entry may use the fallback.
        let source = "```html\n<p>x</p>\n```";
        let result = extract_blocks(source, &page_spec());

        assert!(result.contains_key("index.html"));
        assert!(!result.contains_key("title.txt"));
    }

    #[test]
    fn markers_win_over_fenced_fallback() {
        let source = "```html\n<p>fence</p>\n```\nNEW_PAGE_START<p>marker</p>NEW_PAGE_END";
        let result = extract_blocks(source, &page_spec());

        assert_eq!(result["index.html"].content, "<p>marker</p>");
    }

    #[test]
    fn duplicate_spec_names_are_ignored() {
        let spec = ExtractionSpec::new()
            .entry("a", "A_START", "A_END")
            .entry("a", "B_START", "B_END");

        assert_eq!(spec.entries().len(), 1);
        assert_eq!(spec.entries()[0].start_token, "A_START");
    }

    #[test]
    fn fenced_block_requires_matching_tag() {
        let source = "```json\n{}\n```";
        assert!(fenced_block(source, "html").is_none());
        assert_eq!(fenced_block(source, "json").unwrap(), "{}");
    }

    #[test]
    fn strip_code_fence_removes_fence_lines() {
        assert_eq!(strip_code_fence("```json\n{ \"a\": 1 }\n```"), "{ \"a\": 1 }");
        assert_eq!(strip_code_fence("```tsx\nexport default X;\n```"), "export default X;");
        assert_eq!(strip_code_fence("```\nplain\n```"), "plain");
    }

    #[test]
    fn strip_code_fence_passes_unfenced_content_through() {
        assert_eq!(strip_code_fence("const x = 1;"), "const x = 1;");
        assert_eq!(strip_code_fence(""), "");
    }
}
