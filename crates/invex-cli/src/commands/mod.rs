//! CLI commands.

pub mod batch;
pub mod config;
pub mod process;
pub mod vendors;

use std::path::Path;

use anyhow::Context;

use invex_core::{Document, InvexConfig};

/// Load the configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        let path = Path::new(path);
        if path.exists() {
            return InvexConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()));
        }
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let default = config::default_config_path();
    if default.exists() {
        return Ok(InvexConfig::from_file(&default)?);
    }
    Ok(InvexConfig::default())
}

/// Read a tokenizer dump: a serialized `Document`.
///
/// A dump without a file name takes the dump's own file name.
pub async fn load_document(path: &Path) -> anyhow::Result<Document> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut document: Document = serde_json::from_str(&content)
        .with_context(|| format!("Invalid token file {}", path.display()))?;

    if document.file_name.is_empty() {
        document.file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }
    Ok(document)
}
