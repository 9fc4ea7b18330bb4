// src/storage/mod.rs
use crate::utils::error::StorageError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes every extracted file under `base_dir/<project>/<relative path>`,
    /// creating nested directories (app/, components/) as needed. Returns the
    /// written paths.
    pub fn save_project(
        &self,
        project: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let project_dir = self.base_dir.join(project);
        let mut written = Vec::with_capacity(files.len());

        for (name, content) in files {
            let relative = sanitize_relative(name)
                .ok_or_else(|| StorageError::UnsafePath(name.clone()))?;
            let file_path = project_dir.join(relative);

            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }

            fs::write(&file_path, content).map_err(StorageError::IoError)?;
            tracing::info!("Saved {} ({} bytes)", file_path.display(), content.len());
            written.push(file_path);
        }

        Ok(written)
    }

    /// Writes `base_dir/<project>/manifest.json` describing the extraction.
    pub fn save_manifest(
        &self,
        project: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<PathBuf, StorageError> {
        let project_dir = self.base_dir.join(project);
        if !project_dir.exists() {
            fs::create_dir_all(&project_dir).map_err(StorageError::IoError)?;
        }

        let manifest = manifest_json(project, files);
        let manifest_str = serde_json::to_string_pretty(&manifest)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let file_path = project_dir.join("manifest.json");
        fs::write(&file_path, manifest_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved manifest to {}", file_path.display());

        Ok(file_path)
    }
}

/// Builds the manifest JSON for a set of extracted files.
pub fn manifest_json(project: &str, files: &BTreeMap<String, String>) -> serde_json::Value {
    let file_entries: Vec<serde_json::Value> = files
        .iter()
        .map(|(name, content)| {
            serde_json::json!({
                "path": name,
                "bytes": content.len(),
            })
        })
        .collect();

    serde_json::json!({
        "project": project,
        "file_count": files.len(),
        "files": file_entries,
        "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

/// Rejects path components that would escape the project directory.
/// Extracted names come from static specs, but the primary-fallback name is
/// caller-supplied.
fn sanitize_relative(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}
