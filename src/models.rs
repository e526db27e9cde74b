use std::sync::Arc;

use crate::config::Config;
use crate::storage::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn MediaStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

// Response bodies

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadResponse {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReadResponse {
    pub url: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
