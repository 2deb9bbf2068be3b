//! Metamodel Loading
//!
//! Walks an input directory for metamodel resources and parses each one,
//! recording a content digest alongside the parsed model.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::Metamodel;
use crate::checksum::Checksum;
use crate::error::{Result, TransformError};

/// Configuration for resource discovery
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// File extensions treated as metamodel resources
    pub extensions: Vec<String>,
    /// Skip resources whose relative path starts with one of these
    pub skip_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string()],
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
        }
    }
}

/// A parsed input resource
#[derive(Debug, Clone)]
pub struct Resource {
    /// Path relative to the input root
    pub path: PathBuf,
    /// SHA256 of the raw file content
    pub digest: Checksum,
    pub metamodel: Metamodel,
}

/// Collect resource paths (relative to `input_dir`) in a stable order
pub fn collect_resources(input_dir: &Path, config: &LoadConfig) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| config.extensions.iter().any(|x| x == ext))
            .unwrap_or(false);
        if !matches_ext {
            continue;
        }

        let relative = path.strip_prefix(input_dir)?.to_path_buf();
        let relative_str = relative.to_string_lossy().replace('\\', "/");
        if config.skip_prefixes.iter().any(|p| relative_str.starts_with(p)) {
            continue;
        }

        paths.push(relative);
    }

    Ok(paths)
}

/// Load and parse one resource
pub fn load_resource(input_dir: &Path, relative: &Path) -> Result<Resource> {
    let full = input_dir.join(relative);
    let content = fs::read_to_string(&full)?;
    let digest = Checksum::of_content(&content);

    let metamodel: Metamodel =
        serde_json::from_str(&content).map_err(|source| TransformError::Parse {
            path: full.display().to_string(),
            source,
        })?;

    tracing::debug!(
        path = %relative.display(),
        packages = metamodel.packages.len(),
        "loaded metamodel resource"
    );

    Ok(Resource {
        path: relative.to_path_buf(),
        digest,
        metamodel,
    })
}
