use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, warn};

use crate::middleware::StagedUpload;
use crate::models::{AppState, UploadResponse};
use crate::storage::{ResourceType, UploadOptions};
use crate::types::{AppResult, Category};

/// One `POST /upload-{folder}` route per category, all served by `upload_asset`
pub fn router() -> Router<AppState> {
    Category::ALL
        .into_iter()
        .fold(Router::new(), |router, category| {
            router.route(
                &category.route_path(),
                post(move |state: State<AppState>, upload: StagedUpload| {
                    upload_asset(state, category, upload)
                }),
            )
        })
}

/// Forward a staged file to the store under the category's folder.
///
/// The staged copy is discarded before responding, whether the store
/// accepted the file or not.
pub async fn upload_asset(
    State(state): State<AppState>,
    category: Category,
    upload: StagedUpload,
) -> AppResult<Json<UploadResponse>> {
    info!(
        category = %category,
        bytes = upload.size(),
        file_name = ?upload.file_name(),
        content_type = ?upload.content_type(),
        "Upload request received"
    );

    let options = UploadOptions {
        resource_type: ResourceType::Auto,
        folder: category.folder().to_string(),
        file_name: upload.file_name().map(|s| s.to_string()),
    };

    let outcome = state.store.upload(upload.path(), &options).await;

    let staged_path = upload.path().to_path_buf();
    if let Err(e) = upload.discard() {
        warn!(path = %staged_path.display(), error = %e, "Failed to remove staged upload");
    }

    let asset = outcome?;
    info!(category = %category, public_id = %asset.public_id, "Upload stored");

    Ok(Json(UploadResponse {
        public_id: asset.public_id,
        url: asset.secure_url,
    }))
}
