//! services/api/src/adapters/media_storage.rs
//!
//! HTTP adapter for the object-storage/CDN collaborator, implementing the
//! `MediaStorageService` port. Uploads use the Cloudinary-style unsigned
//! upload protocol: a base64 data URI in, a durable `secure_url` out.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use creator_studio_core::ports::{MediaStorageService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `MediaStorageService` against an HTTP upload
/// endpoint.
#[derive(Clone)]
pub struct HttpMediaStorageAdapter {
    http: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl HttpMediaStorageAdapter {
    /// Creates a new `HttpMediaStorageAdapter`.
    pub fn new(http: reqwest::Client, upload_url: String, upload_preset: String) -> Self {
        Self {
            http,
            upload_url,
            upload_preset,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

//=========================================================================================
// `MediaStorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MediaStorageService for HttpMediaStorageAdapter {
    async fn store(&self, bytes: &[u8]) -> PortResult<String> {
        let data_uri = format!("data:image/png;base64,{}", BASE64.encode(bytes));

        let response = self
            .http
            .post(&self.upload_url)
            .json(&serde_json::json!({
                "file": data_uri,
                "upload_preset": self.upload_preset,
            }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "media upload failed with status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(body.secure_url)
    }
}
