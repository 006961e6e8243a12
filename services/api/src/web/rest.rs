//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every endpoint answers with the same envelope: `success` plus one of
//! `content`, `creations`, or `message`. Clients branch on `success` only.

use axum::{
    extract::{Extension, Multipart, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;
use creator_studio_core::{CallerContext, Creation, CreationError, GenerationRequest};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_article_handler,
        generate_blog_title_handler,
        generate_image_handler,
        remove_image_background_handler,
        remove_object_handler,
        review_resume_handler,
        get_user_creations_handler,
        get_published_creations_handler,
        toggle_like_handler,
    ),
    components(schemas(
        GenerateArticleRequest,
        GenerateBlogTitleRequest,
        GenerateImageRequest,
        ToggleLikeRequest,
        ResponseEnvelope,
        CreationDto,
    )),
    tags(
        (name = "Creator Studio API", description = "Quota-gated AI generation endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The uniform response envelope shared by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creations: Option<Vec<CreationDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    fn content(content: String) -> Self {
        Self {
            success: true,
            content: Some(content),
            creations: None,
            message: None,
        }
    }

    fn creations(creations: Vec<CreationDto>) -> Self {
        Self {
            success: true,
            content: None,
            creations: Some(creations),
            message: None,
        }
    }

    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            content: None,
            creations: None,
            message: Some(message.into()),
        }
    }
}

/// A creation as the API reports it.
#[derive(Serialize, ToSchema)]
pub struct CreationDto {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: String,
    pub prompt: String,
    pub content: String,
    pub publish: bool,
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Creation> for CreationDto {
    fn from(creation: Creation) -> Self {
        Self {
            id: creation.id,
            owner_id: creation.owner_id,
            kind: creation.kind.as_str().to_string(),
            prompt: creation.prompt,
            content: creation.content,
            publish: creation.publish,
            liked_by: creation.liked_by,
            created_at: creation.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateArticleRequest {
    /// The topic to write about.
    pub prompt: String,
    /// Requested article length in tokens (client tiers: 800/1200/1600).
    pub length: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateBlogTitleRequest {
    pub prompt: String,
    pub category: String,
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateImageRequest {
    pub prompt: String,
    pub style: String,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct ToggleLikeRequest {
    pub id: Uuid,
}

//=========================================================================================
// Multipart helpers
//=========================================================================================

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Creation(CreationError::Validation(format!(
        "Failed to read multipart data: {e}"
    )))
}

fn missing_part(what: &str) -> ApiError {
    ApiError::Creation(CreationError::Validation(format!("{what} is required.")))
}

/// Collect the named parts of an upload form. File parts land as bytes, text
/// parts as strings; unknown parts are skipped.
async fn read_upload_form(
    multipart: &mut Multipart,
    file_part: &str,
    text_part: Option<&str>,
) -> Result<(Option<Vec<u8>>, Option<String>), ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut text: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(n) if n == file_part => {
                file = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            Some(n) if Some(n) == text_part => {
                text = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok((file, text))
}

//=========================================================================================
// Generation Handlers
//=========================================================================================

/// Generate an article on a topic.
#[utoipa::path(
    post,
    path = "/api/ai/generate-article",
    request_body = GenerateArticleRequest,
    responses(
        (status = 200, description = "Article generated and stored", body = ResponseEnvelope),
        (status = 429, description = "Free-tier limit reached", body = ResponseEnvelope),
    )
)]
pub async fn generate_article_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<GenerateArticleRequest>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let creation = state
        .pipeline
        .run(
            &caller,
            GenerationRequest::Article {
                topic: req.prompt,
                length: req.length,
            },
        )
        .await?;
    Ok(Json(ResponseEnvelope::content(creation.content)))
}

/// Suggest blog titles for a topic within a category.
#[utoipa::path(
    post,
    path = "/api/ai/generate-blog-title",
    request_body = GenerateBlogTitleRequest,
    responses(
        (status = 200, description = "Titles generated and stored", body = ResponseEnvelope),
        (status = 429, description = "Free-tier limit reached", body = ResponseEnvelope),
    )
)]
pub async fn generate_blog_title_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<GenerateBlogTitleRequest>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let creation = state
        .pipeline
        .run(
            &caller,
            GenerationRequest::BlogTitle {
                topic: req.prompt,
                category: req.category,
            },
        )
        .await?;
    Ok(Json(ResponseEnvelope::content(creation.content)))
}

/// Generate an image from a prompt, optionally publishing it to the gallery.
#[utoipa::path(
    post,
    path = "/api/ai/generate-image",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Image generated, stored, and uploaded", body = ResponseEnvelope),
        (status = 403, description = "Premium plan required", body = ResponseEnvelope),
    )
)]
pub async fn generate_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<GenerateImageRequest>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let creation = state
        .pipeline
        .run(
            &caller,
            GenerationRequest::Image {
                prompt: req.prompt,
                style: req.style,
                publish: req.publish,
            },
        )
        .await?;
    Ok(Json(ResponseEnvelope::content(creation.content)))
}

/// Remove the background from an uploaded image.
#[utoipa::path(
    post,
    path = "/api/ai/remove-image-background",
    request_body(content_type = "multipart/form-data", description = "An `image` file part."),
    responses(
        (status = 200, description = "Edited image uploaded", body = ResponseEnvelope),
        (status = 403, description = "Premium plan required", body = ResponseEnvelope),
    )
)]
pub async fn remove_image_background_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let (image, _) = read_upload_form(&mut multipart, "image", None).await?;
    let image = image.ok_or_else(|| missing_part("An image file"))?;

    let creation = state
        .pipeline
        .run(&caller, GenerationRequest::RemoveBackground { image })
        .await?;
    Ok(Json(ResponseEnvelope::content(creation.content)))
}

/// Erase a named object from an uploaded image.
#[utoipa::path(
    post,
    path = "/api/ai/remove-object",
    request_body(content_type = "multipart/form-data", description = "An `image` file part and an `object` text part."),
    responses(
        (status = 200, description = "Edited image uploaded", body = ResponseEnvelope),
        (status = 403, description = "Premium plan required", body = ResponseEnvelope),
    )
)]
pub async fn remove_object_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let (image, object) = read_upload_form(&mut multipart, "image", Some("object")).await?;
    let image = image.ok_or_else(|| missing_part("An image file"))?;
    let object = object.ok_or_else(|| missing_part("An object to remove"))?;

    let creation = state
        .pipeline
        .run(&caller, GenerationRequest::RemoveObject { image, object })
        .await?;
    Ok(Json(ResponseEnvelope::content(creation.content)))
}

/// Review an uploaded PDF resume.
#[utoipa::path(
    post,
    path = "/api/ai/review-resume",
    request_body(content_type = "multipart/form-data", description = "A `resume` PDF file part, at most 5 MB."),
    responses(
        (status = 200, description = "Review generated and stored", body = ResponseEnvelope),
        (status = 400, description = "Missing or oversized resume", body = ResponseEnvelope),
    )
)]
pub async fn review_resume_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let (resume, _) = read_upload_form(&mut multipart, "resume", None).await?;
    let resume = resume.ok_or_else(|| missing_part("A resume file"))?;

    let creation = state
        .pipeline
        .run(&caller, GenerationRequest::ResumeReview { resume })
        .await?;
    Ok(Json(ResponseEnvelope::content(creation.content)))
}

//=========================================================================================
// Creation Listing and Interaction Handlers
//=========================================================================================

/// All of the caller's creations, newest first.
#[utoipa::path(
    get,
    path = "/api/user/get-user-creations",
    responses(
        (status = 200, description = "The caller's creations", body = ResponseEnvelope),
    )
)]
pub async fn get_user_creations_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let creations = state.pipeline.creations_for(&caller.user_id).await?;
    Ok(Json(ResponseEnvelope::creations(
        creations.into_iter().map(CreationDto::from).collect(),
    )))
}

/// The public gallery: published creations, newest first.
#[utoipa::path(
    get,
    path = "/api/user/get-published-creations",
    responses(
        (status = 200, description = "Published creations", body = ResponseEnvelope),
    )
)]
pub async fn get_published_creations_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let creations = state.pipeline.published_creations().await?;
    Ok(Json(ResponseEnvelope::creations(
        creations.into_iter().map(CreationDto::from).collect(),
    )))
}

/// Flip the caller's like on a creation.
#[utoipa::path(
    post,
    path = "/api/user/toggle-like-creation",
    request_body = ToggleLikeRequest,
    responses(
        (status = 200, description = "Like toggled", body = ResponseEnvelope),
        (status = 404, description = "Creation not found", body = ResponseEnvelope),
    )
)]
pub async fn toggle_like_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<ToggleLikeRequest>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let outcome = state.pipeline.toggle_like(req.id, &caller.user_id).await?;
    Ok(Json(ResponseEnvelope::message(outcome.message())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_unset_fields() {
        let body = serde_json::to_value(ResponseEnvelope::content("hello".to_string())).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["content"], "hello");
        assert!(body.get("creations").is_none());
        assert!(body.get("message").is_none());
    }

    #[test]
    fn envelope_with_message_only() {
        let body = serde_json::to_value(ResponseEnvelope::message("Creation Liked")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Creation Liked");
        assert!(body.get("content").is_none());
    }
}
