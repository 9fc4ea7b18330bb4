// src/extractors/mod.rs
pub mod blocks;
pub mod html;
pub mod project;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use blocks::{extract_blocks, ExtractedFile, ExtractionSpec};
#[allow(unused_imports)]
pub use html::{split_page_assets, PageAssets};
#[allow(unused_imports)]
pub use project::{extract_page, extract_project, NEXTJS_PROJECT_SPEC, PAGE_EDIT_SPEC, SINGLE_PAGE_SPEC};
