//! Timestamp and notes export
//!
//! The backend renders the file; we only pick the content and write the
//! returned bytes into the download directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::api::models::DownloadRequest;
use crate::api::Backend;
use crate::error::{Result, TutorError};
use crate::knowledge::KnowledgeRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// `HH:MM:SS - title` per knowledge point
    Timestamps,
    /// The full summary as markdown
    Notes,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Timestamps => ".txt",
            ExportKind::Notes => ".md",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            ExportKind::Timestamps => "timestamps",
            ExportKind::Notes => "notes",
        }
    }

    /// Content to export, or `None` when there is nothing to write
    pub fn content(&self, registry: &KnowledgeRegistry, summary: &str) -> Option<String> {
        match self {
            ExportKind::Timestamps if !registry.is_empty() => Some(registry.timestamp_lines()),
            ExportKind::Notes if !summary.trim().is_empty() => Some(summary.to_string()),
            _ => None,
        }
    }
}

impl std::str::FromStr for ExportKind {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "timestamps" => Ok(ExportKind::Timestamps),
            "notes" => Ok(ExportKind::Notes),
            other => Err(TutorError::Configuration(format!("Unknown export kind: {}", other))),
        }
    }
}

/// File name stem for an export, with path separators replaced
pub fn export_stem(title: &str, kind: ExportKind) -> String {
    let title = if title.trim().is_empty() { "video" } else { title.trim() };
    let safe: String = title
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();
    format!("{}_{}", safe, kind.suffix())
}

pub struct Exporter {
    backend: Arc<dyn Backend>,
    download_dir: PathBuf,
}

impl Exporter {
    pub fn new(backend: Arc<dyn Backend>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Render `content` through the backend and save it, returning the file path
    pub async fn export(&self, kind: ExportKind, title: &str, content: String) -> Result<PathBuf> {
        let filename = export_stem(title, kind);
        let request = DownloadRequest {
            content,
            filename: filename.clone(),
            file_extension: kind.extension().to_string(),
        };

        let bytes = self.backend.download(&request).await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(format!("{}{}", filename, kind.extension()));
        tokio::fs::write(&path, &bytes).await?;

        info!("💾 Exported {} bytes to: {}", bytes.len(), path.display());
        Ok(path)
    }
}
