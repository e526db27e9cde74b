//! Multipart staging
//!
//! `StagedUpload` is the extractor every upload route takes. It reads the
//! multipart body and streams the single file part to a uniquely named file
//! inside the staging directory before the handler runs.
//!
//! The staged file belongs to the request: `discard()` removes it, and so
//! does dropping the value, so an early return or a failed remote call
//! can't leave files behind in the staging directory.

use axum::extract::{FromRequest, Multipart, Request};
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::models::AppState;
use crate::types::{AppError, AppResult};

#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    file_name: Option<String>,
    content_type: Option<String>,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the client sent for the file part, if any
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Remove the staged file now and report failures
    pub fn discard(self) -> std::io::Result<()> {
        self.path.close()
    }
}

impl FromRequest<AppState> for StagedUpload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Multipart {
                status: e.status(),
                message: e.body_text(),
            })?;

        let upload = &state.config.upload;
        stage_multipart(&mut multipart, &upload.staging_dir, &upload.field_name).await
    }
}

/// Stage the one file part named `field_name`. Text fields are ignored.
pub async fn stage_multipart(
    multipart: &mut Multipart,
    staging_dir: &Path,
    field_name: &str,
) -> AppResult<StagedUpload> {
    let mut staged: Option<StagedUpload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart {
            status: e.status(),
            message: e.body_text(),
        })?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        if name != field_name {
            if is_file {
                return Err(AppError::InvalidUpload(format!(
                    "Unexpected file field {:?}; send the file as {:?}",
                    name, field_name
                )));
            }
            continue;
        }

        if !is_file {
            continue;
        }

        if staged.is_some() {
            return Err(AppError::InvalidUpload(
                "Only one file may be uploaded per request".to_string(),
            ));
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());

        let (std_file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(staging_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(std_file);

        let mut size = 0u64;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Multipart {
                status: e.status(),
                message: e.body_text(),
            })?
        {
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(path = %path.display(), bytes = size, "Staged upload");

        staged = Some(StagedUpload {
            path,
            file_name,
            content_type,
            size,
        });
    }

    staged.ok_or(AppError::MissingFile)
}
