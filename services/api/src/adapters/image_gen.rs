//! services/api/src/adapters/image_gen.rs
//!
//! This module contains the adapter for text-to-image generation.
//! It implements the `ImageGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::images::{CreateImageRequestArgs, Image, ImageModel, ImageResponseFormat, ImageSize},
    Client,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use creator_studio_core::ports::{ImageGenerationService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ImageGenerationService` using an
/// OpenAI-compatible image model. The model is asked for a base64 payload so
/// the raw bytes can be handed straight to media storage.
#[derive(Clone)]
pub struct OpenAiImageAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiImageAdapter {
    /// Creates a new `OpenAiImageAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ImageGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageGenerationService for OpenAiImageAdapter {
    async fn generate_image(&self, prompt: &str) -> PortResult<Vec<u8>> {
        let request = CreateImageRequestArgs::default()
            .model(ImageModel::Other(self.model.clone()))
            .prompt(prompt)
            .n(1)
            .size(ImageSize::S1024x1024)
            .response_format(ImageResponseFormat::B64Json)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .images()
            .generate(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let image = response
            .data
            .first()
            .ok_or_else(|| PortError::Provider("no image returned".to_string()))?;

        match image.as_ref() {
            Image::B64Json { b64_json, .. } => BASE64
                .decode(b64_json.as_str())
                .map_err(|e| PortError::Provider(format!("undecodable image payload: {e}"))),
            Image::Url { .. } => Err(PortError::Provider(
                "provider returned a URL instead of the requested base64 payload".to_string(),
            )),
        }
    }
}
