//! Asset lookup and deletion
//!
//! - `GET /read/{*id}` - delivery URL for an asset (no network call unless
//!   `READ_VERIFY_EXISTS` is on)
//! - `DELETE /delete/{*public_id}` - remove an asset from the store
//!
//! Both take the full public id, folder included (`products/abc123`).

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, warn};

use crate::models::{AppState, DeleteResponse, ReadResponse};
use crate::storage::{DestroyStatus, ResourceType};
use crate::types::{AppError, AppResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/read/{*id}", get(read_asset))
        .route("/delete/{*public_id}", delete(delete_asset))
}

async fn read_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReadResponse>> {
    let url = state.store.url_for(&id, ResourceType::Auto)?;

    if state.config.read.verify_exists && !state.store.exists(&id, ResourceType::Auto).await? {
        return Err(AppError::NotFound(format!("Asset {} not found", id)));
    }

    Ok(Json(ReadResponse { url }))
}

async fn delete_asset(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    info!(public_id = %public_id, "Delete request received");

    let outcome = state.store.destroy(&public_id, ResourceType::Auto).await?;

    match outcome.status() {
        DestroyStatus::Deleted => {
            info!(public_id = %public_id, "Asset deleted");
            Ok(Json(DeleteResponse {
                message: "Asset deleted successfully".to_string(),
                result: outcome.raw.clone(),
            }))
        }
        DestroyStatus::NotFound => Err(AppError::NotFound("Asset not found".to_string())),
        DestroyStatus::Failed(result) => {
            warn!(public_id = %public_id, result = ?result, "Store refused delete");
            Err(AppError::DeleteFailed("Failed to delete asset".to_string()))
        }
    }
}
