//! crates/creator_studio_core/src/pipeline.rs
//!
//! The request orchestrator and provider dispatcher.
//!
//! A request moves through: validate -> quota gate -> dispatch -> store ->
//! counter advance. The counter only ever advances after a successful insert,
//! so a failed provider call or a failed write can never consume free-tier
//! quota.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::{CallerContext, Creation, CreationKind, NewCreation};
use crate::error::CreationError;
use crate::likes::{self, LikeOutcome};
use crate::ports::{
    CreationStore, DocumentExtractionService, IdentityService, ImageEditService,
    ImageGenerationService, MediaStorageService, TextGenerationService,
};
use crate::quota::{self, OperationClass, QuotaPolicy};

/// Output ceiling for blog-title suggestions.
const BLOG_TITLE_MAX_TOKENS: u32 = 200;
/// Output ceiling for resume reviews.
const RESUME_REVIEW_MAX_TOKENS: u32 = 1000;

/// Tunable limits for the pipeline, injected by the service at startup.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    pub quota: QuotaPolicy,
    /// Hard cap on the caller-requested article length. The client offers
    /// 800/1200/1600 token tiers; anything above the cap is clamped.
    pub max_article_tokens: u32,
    /// Resume uploads above this size are rejected before extraction.
    pub max_resume_bytes: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            quota: QuotaPolicy::default(),
            max_article_tokens: 1600,
            max_resume_bytes: 5 * 1024 * 1024,
        }
    }
}

/// One validated generation request, ready for dispatch.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Article { topic: String, length: u32 },
    BlogTitle { topic: String, category: String },
    Image { prompt: String, style: String, publish: bool },
    RemoveBackground { image: Vec<u8> },
    RemoveObject { image: Vec<u8>, object: String },
    ResumeReview { resume: Vec<u8> },
}

impl GenerationRequest {
    pub fn kind(&self) -> CreationKind {
        match self {
            Self::Article { .. } => CreationKind::Article,
            Self::BlogTitle { .. } => CreationKind::BlogTitle,
            Self::Image { .. } | Self::RemoveBackground { .. } | Self::RemoveObject { .. } => {
                CreationKind::Image
            }
            Self::ResumeReview { .. } => CreationKind::ResumeReview,
        }
    }

    pub fn operation_class(&self) -> OperationClass {
        match self {
            Self::Article { .. } | Self::BlogTitle { .. } | Self::ResumeReview { .. } => {
                OperationClass::Standard
            }
            Self::Image { .. } | Self::RemoveBackground { .. } | Self::RemoveObject { .. } => {
                OperationClass::PremiumOnly
            }
        }
    }

    /// Whether the caller asked for the result to be publicly visible.
    /// Only generated images can be published at creation time.
    fn publish(&self) -> bool {
        matches!(self, Self::Image { publish: true, .. })
    }

    /// Centralized input validation, run before the quota gate so malformed
    /// requests never reach a provider and never consume quota.
    fn validate(&self, limits: &PipelineLimits) -> Result<(), CreationError> {
        let invalid = |msg: &str| Err(CreationError::Validation(msg.to_string()));
        match self {
            Self::Article { topic, length } => {
                if topic.trim().is_empty() {
                    return invalid("A topic is required.");
                }
                if *length == 0 {
                    return invalid("Article length must be greater than zero.");
                }
            }
            Self::BlogTitle { topic, category } => {
                if topic.trim().is_empty() {
                    return invalid("A topic is required.");
                }
                if category.trim().is_empty() {
                    return invalid("A category is required.");
                }
            }
            Self::Image { prompt, style, .. } => {
                if prompt.trim().is_empty() {
                    return invalid("A prompt is required.");
                }
                if style.trim().is_empty() {
                    return invalid("An image style is required.");
                }
            }
            Self::RemoveBackground { image } => {
                if image.is_empty() {
                    return invalid("An image file is required.");
                }
            }
            Self::RemoveObject { image, object } => {
                if image.is_empty() {
                    return invalid("An image file is required.");
                }
                if object.trim().is_empty() {
                    return invalid("An object to remove is required.");
                }
            }
            Self::ResumeReview { resume } => {
                if resume.is_empty() {
                    return invalid("A resume file is required.");
                }
                if resume.len() > limits.max_resume_bytes {
                    return invalid("Resume file size exceeds allowed size (5MB).");
                }
            }
        }
        Ok(())
    }
}

/// Provider output, normalized so the orchestrator and store never branch on
/// provider-specific encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedContent {
    Text(String),
    MediaUrl(String),
}

impl GeneratedContent {
    fn into_inner(self) -> String {
        match self {
            Self::Text(s) | Self::MediaUrl(s) => s,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::MediaUrl(s) => s.trim().is_empty(),
        }
    }
}

/// The quota-gated creation pipeline. Holds one `Arc` per collaborator port;
/// cloning is cheap and every request runs independently.
#[derive(Clone)]
pub struct CreationPipeline {
    pub store: Arc<dyn CreationStore>,
    pub identity: Arc<dyn IdentityService>,
    pub text: Arc<dyn TextGenerationService>,
    pub images: Arc<dyn ImageGenerationService>,
    pub image_edit: Arc<dyn ImageEditService>,
    pub media: Arc<dyn MediaStorageService>,
    pub documents: Arc<dyn DocumentExtractionService>,
    pub limits: PipelineLimits,
}

impl CreationPipeline {
    /// Run one generation request end to end on behalf of `caller`.
    ///
    /// On success the creation has been durably stored and, when the
    /// operation was free-tier-gated, the caller's usage counter advanced.
    /// A counter-advance failure is logged and deliberately does not fail
    /// the request: the content already exists and undercounting on this
    /// rare path is the accepted trade-off.
    pub async fn run(
        &self,
        caller: &CallerContext,
        request: GenerationRequest,
    ) -> Result<Creation, CreationError> {
        request.validate(&self.limits)?;

        let class = request.operation_class();
        quota::admit(caller.plan, caller.free_usage, class, &self.limits.quota)?;

        let (prompt, content) = self.dispatch(&request).await?;
        if content.is_empty() {
            return Err(CreationError::Provider(
                "provider returned empty content".to_string(),
            ));
        }

        let creation = self
            .store
            .insert(NewCreation {
                owner_id: caller.user_id.clone(),
                kind: request.kind(),
                prompt,
                content: content.into_inner(),
                publish: request.publish(),
            })
            .await
            .map_err(CreationError::from_store)?;

        if quota::counts_against_quota(caller.plan, class) {
            if let Err(err) = self.identity.increment_free_usage(&caller.user_id).await {
                warn!(
                    user_id = %caller.user_id,
                    error = %err,
                    "failed to advance free-usage counter; creation kept"
                );
            }
        }

        Ok(creation)
    }

    /// Map a request to the right provider call and normalize the output.
    /// Returns the prompt to record on the creation alongside the content.
    async fn dispatch(
        &self,
        request: &GenerationRequest,
    ) -> Result<(String, GeneratedContent), CreationError> {
        match request {
            GenerationRequest::Article { topic, length } => {
                let prompt = format!("Generate an article about {topic}");
                let max_tokens = (*length).min(self.limits.max_article_tokens);
                let text = self
                    .text
                    .generate_text(&prompt, max_tokens)
                    .await
                    .map_err(CreationError::from_provider)?;
                Ok((topic.clone(), GeneratedContent::Text(text)))
            }
            GenerationRequest::BlogTitle { topic, category } => {
                let prompt = format!(
                    "Suggest some relevant blog title for the category \"{category}\" based on the topic : {topic}"
                );
                let text = self
                    .text
                    .generate_text(&prompt, BLOG_TITLE_MAX_TOKENS)
                    .await
                    .map_err(CreationError::from_provider)?;
                Ok((topic.clone(), GeneratedContent::Text(text)))
            }
            GenerationRequest::Image { prompt, style, .. } => {
                let full_prompt = format!("Generate a {style} style image of {prompt}");
                let bytes = self
                    .images
                    .generate_image(&full_prompt)
                    .await
                    .map_err(CreationError::from_provider)?;
                let url = self.store_media(&bytes).await?;
                Ok((prompt.clone(), GeneratedContent::MediaUrl(url)))
            }
            GenerationRequest::RemoveBackground { image } => {
                let instruction = "Remove the background of the image";
                let edited = self
                    .image_edit
                    .edit_image(image, instruction)
                    .await
                    .map_err(CreationError::from_provider)?;
                let url = self.store_media(&edited).await?;
                Ok((instruction.to_string(), GeneratedContent::MediaUrl(url)))
            }
            GenerationRequest::RemoveObject { image, object } => {
                let instruction = format!("Remove the {object} from the image");
                let edited = self
                    .image_edit
                    .edit_image(image, &instruction)
                    .await
                    .map_err(CreationError::from_provider)?;
                let url = self.store_media(&edited).await?;
                Ok((instruction, GeneratedContent::MediaUrl(url)))
            }
            GenerationRequest::ResumeReview { resume } => {
                let resume_text = self
                    .documents
                    .extract_text(resume)
                    .await
                    .map_err(|e| CreationError::Validation(format!("Failed to read resume: {e}")))?;
                let prompt = format!(
                    "You are a professional resume reviewer. Analyze the following resume for \
                     structure, clarity, formatting, and content. Identify any grammatical issues, \
                     inconsistencies, or weak language. Suggest improvements. Resume content: {resume_text}"
                );
                let text = self
                    .text
                    .generate_text(&prompt, RESUME_REVIEW_MAX_TOKENS)
                    .await
                    .map_err(CreationError::from_provider)?;
                Ok((
                    "Review the uploaded resume".to_string(),
                    GeneratedContent::Text(text),
                ))
            }
        }
    }

    async fn store_media(&self, bytes: &[u8]) -> Result<String, CreationError> {
        self.media
            .store(bytes)
            .await
            .map_err(CreationError::from_provider)
    }

    /// All creations owned by the caller, newest first.
    pub async fn creations_for(&self, owner_id: &str) -> Result<Vec<Creation>, CreationError> {
        self.store
            .list_by_owner(owner_id)
            .await
            .map_err(CreationError::from_store)
    }

    /// The public gallery: published creations, newest first.
    pub async fn published_creations(&self) -> Result<Vec<Creation>, CreationError> {
        self.store
            .list_published()
            .await
            .map_err(CreationError::from_store)
    }

    /// Flip the caller's like on a creation.
    pub async fn toggle_like(
        &self,
        creation_id: Uuid,
        user_id: &str,
    ) -> Result<LikeOutcome, CreationError> {
        likes::toggle_like(self.store.as_ref(), creation_id, user_id).await
    }
}
