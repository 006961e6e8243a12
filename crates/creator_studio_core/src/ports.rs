//! crates/creator_studio_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CallerContext, Creation, NewCreation};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Provider failure: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for creations.
///
/// Inserts are append-only; the only mutation the store supports is replacing
/// a creation's like-set, and that write is conditional so callers can detect
/// lost races (see `likes::toggle_like`).
#[async_trait]
pub trait CreationStore: Send + Sync {
    /// Persist a new creation, assigning its `id` and `created_at`.
    async fn insert(&self, creation: NewCreation) -> PortResult<Creation>;

    /// All creations owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> PortResult<Vec<Creation>>;

    /// All published creations, newest first.
    async fn list_published(&self) -> PortResult<Vec<Creation>>;

    async fn get(&self, id: Uuid) -> PortResult<Option<Creation>>;

    /// Replace the like-set of `id`, but only if the stored set still equals
    /// `expected`. Returns `false` (and writes nothing) when another writer
    /// got there first.
    async fn replace_liked_by(
        &self,
        id: Uuid,
        expected: &[String],
        new: &[String],
    ) -> PortResult<bool>;
}

/// The external identity provider: the source of truth for who a caller is,
/// what plan they are on, and how much of the free tier they have consumed.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve an opaque bearer token to the caller it belongs to.
    /// The usage counter must be read fresh here, never cached across requests.
    async fn caller_context(&self, token: &str) -> PortResult<CallerContext>;

    /// Advance the caller's free-usage counter by exactly one.
    async fn increment_free_usage(&self, user_id: &str) -> PortResult<()>;
}

/// Chat-completion style text generation.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate_text(&self, prompt: &str, max_tokens: u32) -> PortResult<String>;
}

/// Text-to-image generation. Returns the raw image bytes; durable storage is
/// the caller's concern.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> PortResult<Vec<u8>>;
}

/// Instruction-driven image editing (background removal, object removal).
#[async_trait]
pub trait ImageEditService: Send + Sync {
    async fn edit_image(&self, image: &[u8], instruction: &str) -> PortResult<Vec<u8>>;
}

/// Object storage / CDN for generated media.
#[async_trait]
pub trait MediaStorageService: Send + Sync {
    /// Store the bytes and return a durable, publicly reachable URL.
    async fn store(&self, bytes: &[u8]) -> PortResult<String>;
}

/// Text extraction from uploaded documents (currently PDF resumes only).
#[async_trait]
pub trait DocumentExtractionService: Send + Sync {
    async fn extract_text(&self, document: &[u8]) -> PortResult<String>;
}
