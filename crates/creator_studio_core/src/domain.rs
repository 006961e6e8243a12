//! crates/creator_studio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Subscription tier of a caller, as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }

    /// Anything the identity provider reports that is not "premium" is
    /// treated as the free tier.
    pub fn from_str(s: &str) -> Self {
        match s {
            "premium" => Self::Premium,
            _ => Self::Free,
        }
    }
}

/// The authenticated caller of a request, resolved fresh per request by the
/// identity provider. `free_usage` is meaningful only when `plan` is `Free`.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: String,
    pub plan: Plan,
    pub free_usage: u32,
}

/// The kind of generation operation a creation was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationKind {
    Article,
    BlogTitle,
    Image,
    ResumeReview,
}

impl CreationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::BlogTitle => "blog-title",
            Self::Image => "image",
            Self::ResumeReview => "resume-review",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "article" => Some(Self::Article),
            "blog-title" => Some(Self::BlogTitle),
            "image" => Some(Self::Image),
            "resume-review" => Some(Self::ResumeReview),
            _ => None,
        }
    }
}

/// A persisted record of one completed generation operation.
///
/// Every field except `liked_by` is immutable once the row is written.
/// `liked_by` has set semantics: a user id appears at most once.
#[derive(Debug, Clone)]
pub struct Creation {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: CreationKind,
    pub prompt: String,
    pub content: String,
    pub publish: bool,
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A creation as it arrives at the store, before `id` and `created_at` are
/// assigned by the insert.
#[derive(Debug, Clone)]
pub struct NewCreation {
    pub owner_id: String,
    pub kind: CreationKind,
    pub prompt: String,
    pub content: String,
    pub publish: bool,
}
