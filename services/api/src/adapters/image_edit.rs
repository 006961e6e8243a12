//! services/api/src/adapters/image_edit.rs
//!
//! This module contains the adapter for instruction-driven image editing
//! (background removal, object removal). It implements the `ImageEditService`
//! port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::images::{CreateImageEditRequestArgs, Image, ImageInput, ImageModel, ImageResponseFormat},
    Client,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use creator_studio_core::ports::{ImageEditService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ImageEditService` using an OpenAI-compatible
/// image-edit model.
#[derive(Clone)]
pub struct OpenAiImageEditAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiImageEditAdapter {
    /// Creates a new `OpenAiImageEditAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ImageEditService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageEditService for OpenAiImageEditAdapter {
    async fn edit_image(&self, image: &[u8], instruction: &str) -> PortResult<Vec<u8>> {
        let input = ImageInput::from_vec_u8("image.png".into(), image.to_vec());

        let request = CreateImageEditRequestArgs::default()
            .image(input)
            .prompt(instruction)
            .model(ImageModel::Other(self.model.clone()))
            .response_format(ImageResponseFormat::B64Json)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .images()
            .edit(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let edited = response
            .data
            .first()
            .ok_or_else(|| PortError::Provider("no edited image returned".to_string()))?;

        match edited.as_ref() {
            Image::B64Json { b64_json, .. } => BASE64
                .decode(b64_json.as_str())
                .map_err(|e| PortError::Provider(format!("undecodable image payload: {e}"))),
            Image::Url { .. } => Err(PortError::Provider(
                "provider returned a URL instead of the requested base64 payload".to_string(),
            )),
        }
    }
}
