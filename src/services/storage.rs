// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! On-disk storage for uploaded bootcamp photos.

use crate::error::AppError;
use std::path::{Path, PathBuf};

/// Deterministic stored name for a bootcamp photo: `bootcamp_<id><ext>`.
///
/// The extension (with its dot) is taken from the client's file name; a name
/// without one yields no extension.
pub fn photo_filename(bootcamp_id: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("bootcamp_{}{}", bootcamp_id, ext)
}

/// Writes photos under a fixed upload root.
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    root: PathBuf,
}

impl PhotoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` as `filename` under the upload root.
    ///
    /// Completes only once the file is on disk; any I/O failure is returned
    /// as [`AppError::Storage`].
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        // Names come from photo_filename, but never let one escape the root.
        if filename.contains('/') || filename.contains('\\') || filename.starts_with('.') {
            return Err(AppError::Storage(format!("Refusing to store {}", filename)));
        }

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create {}: {}", self.root.display(), e))
        })?;

        let path = self.root.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Photo stored");
        Ok(path)
    }

    /// Delete a previously stored photo. A file that is already gone is fine.
    pub async fn remove(&self, filename: &str) -> Result<(), AppError> {
        let path = self.root.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
