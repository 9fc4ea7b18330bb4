// src/extractors/html.rs
//
// Splits a generated HTML page into its body markup, collected styles, and
// collected scripts, so callers can re-host the page inside their own shell.

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static STYLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("style").expect("Failed to compile STYLE_SELECTOR"));

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("Failed to compile SCRIPT_SELECTOR"));

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Failed to compile BODY_SELECTOR"));

static ASSET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("style, script").expect("Failed to compile ASSET_SELECTOR"));

// --- Data Structures ---

/// The three asset groups of one generated page. All fields are trimmed and
/// possibly empty; an empty input produces an all-empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAssets {
    pub body: String,
    pub styles: String,
    pub scripts: String,
}

// --- Splitting ---

/// Parses `html` and returns its body markup with `<style>`/`<script>`
/// elements removed, plus the contents of those elements joined with
/// newlines. Works on full documents and bare fragments alike (the parser
/// synthesizes the missing shell).
pub fn split_page_assets(html: &str) -> PageAssets {
    if html.trim().is_empty() {
        return PageAssets::default();
    }

    let document = Html::parse_document(html);

    let styles = document
        .select(&STYLE_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let scripts = document
        .select(&SCRIPT_SELECTOR)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let body = match document.select(&BODY_SELECTOR).next() {
        Some(body_el) => {
            let mut out = String::new();
            serialize_children_without_assets(body_el, &mut out);
            out.trim().to_string()
        }
        None => String::new(),
    };

    PageAssets { body, styles, scripts }
}

/// Serializes the children of `el` into `out`, skipping `<style>` and
/// `<script>` elements at any depth.
fn serialize_children_without_assets(el: ElementRef, out: &mut String) {
    for node in el.children() {
        if let Some(child) = ElementRef::wrap(node) {
            let name = child.value().name();
            if name == "style" || name == "script" {
                continue;
            }
            if child.select(&ASSET_SELECTOR).next().is_none() {
                // No assets anywhere below, the stock serializer is exact.
                out.push_str(&child.html());
            } else {
                push_open_tag(child, out);
                serialize_children_without_assets(child, out);
                out.push_str(&format!("</{}>", name));
            }
        } else if let Node::Text(text) = node.value() {
            out.push_str(&text.text);
        }
        // Comments and other node types are dropped.
    }
}

fn push_open_tag(el: ElementRef, out: &mut String) {
    out.push('<');
    out.push_str(el.value().name());
    for (key, value) in el.value().attrs() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        push_escaped_attr(value, out);
        out.push('"');
    }
    out.push('>');
}

// Attribute values come back unescaped from the parser; a raw quote would
// terminate the attribute early in the rebuilt markup.
fn push_escaped_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
