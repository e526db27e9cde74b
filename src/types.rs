// Type definitions and enums

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::storage::StoreError;

/// Destination folder of an upload, fixed by the endpoint that received it
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Products,
    Chats,
    Comments,
    Community,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Products,
        Category::Chats,
        Category::Comments,
        Category::Community,
    ];

    pub fn folder(&self) -> &'static str {
        match self {
            Category::Products => "products",
            Category::Chats => "chats",
            Category::Comments => "comments",
            Category::Community => "community",
        }
    }

    pub fn route_path(&self) -> String {
        format!("/upload-{}", self.folder())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.folder())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Multipart body the framework refused to read, with its own status (e.g. 413)
    #[error("Invalid upload: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    DeleteFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile
            | AppError::InvalidUpload(_)
            | AppError::Store(StoreError::InvalidPublicId(_)) => StatusCode::BAD_REQUEST,
            AppError::Multipart { status, .. } => *status,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DeleteFailed(_) | AppError::Store(_) | AppError::Staging(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            warn!(status = %status, error = %message, "Request rejected");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
