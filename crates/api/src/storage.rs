//! Upload storage on the local filesystem.
//!
//! Files live under `ServerConfig::upload_dir` in one sub-directory per
//! category (`contents`, `documents`, `signatures`). The database stores the
//! path relative to the upload root; the router serves that root read-only at
//! `/uploads`, so a stored path `p` is fetched from `/uploads/{p}`.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::Multipart;
use fleetcheck_core::content::{is_allowed_upload, sanitize_filename, ALLOWED_UPLOAD_EXTENSIONS};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const CATEGORY_CONTENTS: &str = "contents";
pub const CATEGORY_DOCUMENTS: &str = "documents";
pub const CATEGORY_SIGNATURES: &str = "signatures";

/// A file part read from a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Text fields and the (optional) `file` part of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> AppResult<&str> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing required '{name}' field")))
    }
}

/// Drain a multipart body. The part named `file` is kept as bytes; every other
/// part is read as text.
pub async fn read_multipart(mut multipart: Multipart) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if !data.is_empty() {
                form.file = Some(UploadedFile {
                    filename,
                    data: data.to_vec(),
                });
            }
        } else if !name.is_empty() {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

async fn write_file(
    root: &Path,
    category: &str,
    stored_name: &str,
    data: &[u8],
) -> AppResult<String> {
    let dir = root.join(category);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Cannot create {}: {e}", dir.display())))?;

    let file_path = dir.join(stored_name);
    tokio::fs::write(&file_path, data)
        .await
        .map_err(|e| {
            AppError::InternalError(format!("Cannot write {}: {e}", file_path.display()))
        })?;

    tracing::debug!(path = %file_path.display(), bytes = data.len(), "Stored upload");
    Ok(format!("{category}/{stored_name}"))
}

/// Store an uploaded document or content file and return its relative path.
///
/// Only whitelisted extensions are accepted. The stored name is prefixed with
/// a random id so two uploads of `manual.pdf` never collide.
pub async fn save_upload(root: &Path, category: &str, file: &UploadedFile) -> AppResult<String> {
    if !is_allowed_upload(&file.filename) {
        return Err(AppError::BadRequest(format!(
            "File type not allowed. Supported: {}",
            ALLOWED_UPLOAD_EXTENSIONS.join(", ")
        )));
    }
    let stored_name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(&file.filename));
    write_file(root, category, &stored_name, &file.data).await
}

/// Store a decoded signature PNG and return its relative path.
pub async fn save_signature(root: &Path, png: &[u8]) -> AppResult<String> {
    let stored_name = format!("{}.png", Uuid::new_v4().simple());
    write_file(root, CATEGORY_SIGNATURES, &stored_name, png).await
}

/// Remove a stored file. A file already gone is not an error.
pub async fn remove_stored(root: &Path, relative: &str) {
    if relative.split('/').any(|part| part == ".." || part.is_empty()) {
        tracing::warn!(path = relative, "Refusing to remove suspicious upload path");
        return;
    }
    let path = root.join(relative);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed upload"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            data: b"%PDF-1.4".to_vec(),
        }
    }

    #[tokio::test]
    async fn upload_is_written_under_category() {
        let dir = tempfile::tempdir().unwrap();
        let rel = save_upload(dir.path(), CATEGORY_DOCUMENTS, &file("Manual Frota.pdf"))
            .await
            .unwrap();
        assert!(rel.starts_with("documents/"));
        assert!(rel.ends_with("_Manual_Frota.pdf"));
        let written = std::fs::read(dir.path().join(&rel)).unwrap();
        assert_eq!(written, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn disallowed_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_upload(dir.path(), CATEGORY_CONTENTS, &file("script.exe")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let rel = save_signature(dir.path(), b"png").await.unwrap();
        remove_stored(dir.path(), &rel).await;
        assert!(!dir.path().join(&rel).exists());
        remove_stored(dir.path(), &rel).await;
    }
}
