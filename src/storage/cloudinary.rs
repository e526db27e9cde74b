// Cloudinary adapter
// Upload API: https://cloudinary.com/documentation/image_upload_api_reference
// Delivery URLs: https://cloudinary.com/documentation/image_transformations#delivery_url_structure
//
// Uploads and deletes go to the signed REST API on api.cloudinary.com.
// Delivery URLs are derived locally from the cloud name and public id.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::signing::sign_params;
use super::{
    validate_public_id, DestroyOutcome, MediaStore, ResourceType, StoreError, StoredAsset,
    UploadOptions,
};
use crate::config::CloudinaryConfig;

pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
    delivery_base: Url,
}

// Error envelope returned by the upload API
#[derive(Deserialize)]
struct CloudinaryErrorResponse {
    error: CloudinaryError,
}

#[derive(Deserialize)]
struct CloudinaryError {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, StoreError> {
        let delivery_base = Url::parse(&config.delivery_base_url).map_err(|e| {
            StoreError::InvalidConfig(format!(
                "delivery base URL {:?}: {}",
                config.delivery_base_url, e
            ))
        })?;
        if delivery_base.cannot_be_a_base() {
            return Err(StoreError::InvalidConfig(format!(
                "delivery base URL {:?} cannot carry a path",
                config.delivery_base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            config,
            delivery_base,
        })
    }

    fn api_url(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(
            params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        )
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Prefer the API's own message, it is what callers get to see
            if let Ok(error_response) = serde_json::from_str::<CloudinaryErrorResponse>(&error_text) {
                return Err(StoreError::Api {
                    status: status.as_u16(),
                    message: error_response.error.message,
                });
            }

            return Err(StoreError::Api {
                status: status.as_u16(),
                message: format!("Cloudinary API error ({}): {}", status, error_text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    async fn upload(
        &self,
        local_path: &Path,
        options: &UploadOptions,
    ) -> Result<StoredAsset, StoreError> {
        let file = tokio::fs::File::open(local_path).await?;
        let length = file.metadata().await?.len();

        let file_name = options
            .file_name
            .clone()
            .or_else(|| {
                local_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(&file_name).first_or_octet_stream();

        let timestamp = Self::timestamp();
        let mut params = vec![("timestamp", timestamp)];
        if !options.folder.is_empty() {
            params.push(("folder", options.folder.clone()));
        }
        let signature = self.sign(&params);

        // Streamed from disk; the staged copy is never buffered whole
        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = self.api_url(options.resource_type, "upload");
        debug!(url = %url, folder = %options.folder, "Uploading to Cloudinary");

        let response = self.client.post(&url).multipart(form).send().await?;

        Self::parse_response(response).await
    }

    fn url_for(&self, public_id: &str, resource_type: ResourceType) -> Result<String, StoreError> {
        validate_public_id(public_id)?;

        let mut url = self.delivery_base.clone();
        if !self.config.secure {
            // https -> http is always permitted by the URL parser
            let _ = url.set_scheme("http");
        }

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::InvalidConfig("delivery base URL cannot carry a path".to_string())
            })?;
            segments
                .pop_if_empty()
                .push(&self.config.cloud_name)
                .push(resource_type.as_str())
                .push("upload")
                .extend(public_id.split('/'));
        }

        Ok(url.to_string())
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<DestroyOutcome, StoreError> {
        validate_public_id(public_id)?;

        let params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", Self::timestamp()),
        ];
        let signature = self.sign(&params);

        let mut form = params;
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));

        let url = self.api_url(resource_type, "destroy");
        debug!(url = %url, public_id = %public_id, "Destroying Cloudinary asset");

        let response = self.client.post(&url).form(&form).send().await?;
        let raw: serde_json::Value = Self::parse_response(response).await?;

        Ok(DestroyOutcome::from_raw(raw))
    }

    async fn exists(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<bool, StoreError> {
        let url = self.url_for(public_id, resource_type)?;
        let response = self.client.head(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StoreError::Api {
                status: status.as_u16(),
                message: format!("Unexpected status {} while checking {}", status, public_id),
            }),
        }
    }
}
