//! crates/creator_studio_core/src/likes.rs
//!
//! The like-toggle state machine. A (creation, user) pair is either `Liked`
//! or `NotLiked`; toggling flips it exactly once.
//!
//! The flip is a read-modify-write against shared state, so it runs under
//! optimistic concurrency: the write only lands if the like-set is still the
//! one we read, and a lost race re-reads and retries. A plain
//! read-then-write would silently drop concurrent flips.

use uuid::Uuid;

use crate::error::CreationError;
use crate::ports::CreationStore;

/// Upper bound on CAS retries before the toggle gives up. Contention on a
/// single creation's like-set is short-lived, so this is generous.
const MAX_TOGGLE_ATTEMPTS: usize = 8;

/// The state a toggle left the (creation, user) pair in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

impl LikeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Liked => "Creation Liked",
            Self::Unliked => "Creation Unliked",
        }
    }
}

/// Add `user_id` to the creation's like-set if absent, remove it if present.
///
/// The final set contains each user at most once, and a genuine flip is never
/// silently lost: on a conflicting concurrent write the state is re-read and
/// the flip re-applied to the fresh set.
pub async fn toggle_like(
    store: &dyn CreationStore,
    creation_id: Uuid,
    user_id: &str,
) -> Result<LikeOutcome, CreationError> {
    for _ in 0..MAX_TOGGLE_ATTEMPTS {
        let creation = store
            .get(creation_id)
            .await
            .map_err(CreationError::from_store)?
            .ok_or_else(|| CreationError::NotFound("Creation not found".to_string()))?;

        let current = creation.liked_by;
        let (next, outcome) = if current.iter().any(|id| id == user_id) {
            let next: Vec<String> = current
                .iter()
                .filter(|id| id.as_str() != user_id)
                .cloned()
                .collect();
            (next, LikeOutcome::Unliked)
        } else {
            let mut next = current.clone();
            next.push(user_id.to_string());
            (next, LikeOutcome::Liked)
        };

        let swapped = store
            .replace_liked_by(creation_id, &current, &next)
            .await
            .map_err(CreationError::from_store)?;
        if swapped {
            return Ok(outcome);
        }
    }

    Err(CreationError::Persistence(
        "like toggle kept losing the update race".to_string(),
    ))
}
