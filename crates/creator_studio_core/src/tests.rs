//! Pipeline tests against in-memory port fakes.
//!
//! Everything here exercises the real orchestrator, gate, dispatcher, and
//! like-toggle logic; only the collaborators behind the ports are faked.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{CallerContext, Creation, CreationKind, NewCreation, Plan};
use crate::error::CreationError;
use crate::likes::LikeOutcome;
use crate::pipeline::{CreationPipeline, GenerationRequest, PipelineLimits};
use crate::ports::{
    CreationStore, DocumentExtractionService, IdentityService, ImageEditService,
    ImageGenerationService, MediaStorageService, PortError, PortResult, TextGenerationService,
};

//=========================================================================================
// In-memory fakes
//=========================================================================================

#[derive(Default)]
struct InMemoryStore {
    rows: Mutex<Vec<Creation>>,
    seq: AtomicU32,
    fail_inserts: AtomicBool,
    /// Number of upcoming `replace_liked_by` calls that should lose the race.
    conflicts: AtomicU32,
}

impl InMemoryStore {
    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn liked_by(&self, id: Uuid) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.liked_by.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CreationStore for InMemoryStore {
    async fn insert(&self, creation: NewCreation) -> PortResult<Creation> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("insert failed".to_string()));
        }
        // Spread timestamps so ordering assertions are deterministic.
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let stored = Creation {
            id: Uuid::new_v4(),
            owner_id: creation.owner_id,
            kind: creation.kind,
            prompt: creation.prompt,
            content: creation.content,
            publish: creation.publish,
            liked_by: Vec::new(),
            created_at: Utc::now() + Duration::milliseconds(i64::from(seq)),
        };
        self.rows.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_by_owner(&self, owner_id: &str) -> PortResult<Vec<Creation>> {
        let mut rows: Vec<Creation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_published(&self) -> PortResult<Vec<Creation>> {
        let mut rows: Vec<Creation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.publish)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> PortResult<Option<Creation>> {
        Ok(self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn replace_liked_by(
        &self,
        id: Uuid,
        expected: &[String],
        new: &[String],
    ) -> PortResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        if self.conflicts.load(Ordering::SeqCst) > 0 {
            // Simulate a concurrent writer landing first: flip the set under
            // this caller so its `expected` no longer matches.
            self.conflicts.fetch_sub(1, Ordering::SeqCst);
            row.liked_by.push("someone-else".to_string());
            return Ok(false);
        }
        if row.liked_by != expected {
            return Ok(false);
        }
        row.liked_by = new.to_vec();
        Ok(true)
    }
}

#[derive(Default)]
struct StubIdentity {
    usage: AtomicU32,
    fail_increment: AtomicBool,
}

#[async_trait]
impl IdentityService for StubIdentity {
    async fn caller_context(&self, _token: &str) -> PortResult<CallerContext> {
        Err(PortError::Unexpected(
            "token resolution is not part of pipeline tests".to_string(),
        ))
    }

    async fn increment_free_usage(&self, _user_id: &str) -> PortResult<()> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("metadata write failed".to_string()));
        }
        self.usage.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct StubText {
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_max_tokens: AtomicU32,
    fail: AtomicBool,
    reply: Mutex<String>,
}

impl StubText {
    fn replying(reply: &str) -> Self {
        let stub = Self::default();
        *stub.reply.lock().unwrap() = reply.to_string();
        stub
    }
}

#[async_trait]
impl TextGenerationService for StubText {
    async fn generate_text(&self, prompt: &str, max_tokens: u32) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.last_max_tokens.store(max_tokens, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Provider("model unavailable".to_string()));
        }
        Ok(self.reply.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct StubImages {
    last_prompt: Mutex<Option<String>>,
}

#[async_trait]
impl ImageGenerationService for StubImages {
    async fn generate_image(&self, prompt: &str) -> PortResult<Vec<u8>> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok(vec![0x89, 0x50, 0x4e, 0x47])
    }
}

#[derive(Default)]
struct StubImageEdit {
    last_instruction: Mutex<Option<String>>,
}

#[async_trait]
impl ImageEditService for StubImageEdit {
    async fn edit_image(&self, _image: &[u8], instruction: &str) -> PortResult<Vec<u8>> {
        *self.last_instruction.lock().unwrap() = Some(instruction.to_string());
        Ok(vec![0xff, 0xd8])
    }
}

#[derive(Default)]
struct StubMedia {
    stored: AtomicUsize,
}

#[async_trait]
impl MediaStorageService for StubMedia {
    async fn store(&self, _bytes: &[u8]) -> PortResult<String> {
        let n = self.stored.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://cdn.example.com/media/{n}.png"))
    }
}

struct StubExtractor {
    text: String,
}

#[async_trait]
impl DocumentExtractionService for StubExtractor {
    async fn extract_text(&self, _document: &[u8]) -> PortResult<String> {
        Ok(self.text.clone())
    }
}

//=========================================================================================
// Harness
//=========================================================================================

struct Harness {
    store: Arc<InMemoryStore>,
    identity: Arc<StubIdentity>,
    text: Arc<StubText>,
    images: Arc<StubImages>,
    image_edit: Arc<StubImageEdit>,
    media: Arc<StubMedia>,
    pipeline: CreationPipeline,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::default());
    let identity = Arc::new(StubIdentity::default());
    let text = Arc::new(StubText::replying("generated text"));
    let images = Arc::new(StubImages::default());
    let image_edit = Arc::new(StubImageEdit::default());
    let media = Arc::new(StubMedia::default());
    let pipeline = CreationPipeline {
        store: store.clone(),
        identity: identity.clone(),
        text: text.clone(),
        images: images.clone(),
        image_edit: image_edit.clone(),
        media: media.clone(),
        documents: Arc::new(StubExtractor {
            text: "Jane Doe. Ten years of systems programming.".to_string(),
        }),
        limits: PipelineLimits::default(),
    };
    Harness {
        store,
        identity,
        text,
        images,
        image_edit,
        media,
        pipeline,
    }
}

fn free_caller(free_usage: u32) -> CallerContext {
    CallerContext {
        user_id: "user_free".to_string(),
        plan: Plan::Free,
        free_usage,
    }
}

fn premium_caller() -> CallerContext {
    CallerContext {
        user_id: "user_premium".to_string(),
        plan: Plan::Premium,
        free_usage: 0,
    }
}

fn article(topic: &str) -> GenerationRequest {
    GenerationRequest::Article {
        topic: topic.to_string(),
        length: 800,
    }
}

//=========================================================================================
// Quota behavior
//=========================================================================================

#[tokio::test]
async fn quota_monotonicity_up_to_the_limit() {
    let h = harness();
    for n in 0..10 {
        let caller = free_caller(h.identity.usage.load(Ordering::SeqCst));
        h.pipeline.run(&caller, article("rust")).await.unwrap();
        assert_eq!(h.identity.usage.load(Ordering::SeqCst), n + 1);
    }

    let caller = free_caller(h.identity.usage.load(Ordering::SeqCst));
    let err = h.pipeline.run(&caller, article("rust")).await.unwrap_err();
    assert!(matches!(err, CreationError::QuotaExceeded));
    assert_eq!(err.to_string(), "Limit reached. Upgrade to continue.");
    assert_eq!(h.store.row_count(), 10);
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn premium_callers_never_touch_the_counter() {
    let h = harness();
    for _ in 0..5 {
        h.pipeline
            .run(&premium_caller(), article("ownership"))
            .await
            .unwrap();
    }
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 0);
    assert_eq!(h.store.row_count(), 5);
}

#[tokio::test]
async fn premium_only_operations_denied_to_free_callers() {
    let h = harness();
    let requests = [
        GenerationRequest::Image {
            prompt: "cat".to_string(),
            style: "Anime style".to_string(),
            publish: false,
        },
        GenerationRequest::RemoveBackground {
            image: vec![1, 2, 3],
        },
        GenerationRequest::RemoveObject {
            image: vec![1, 2, 3],
            object: "scissors".to_string(),
        },
    ];
    for request in requests {
        let err = h.pipeline.run(&free_caller(0), request).await.unwrap_err();
        assert!(matches!(err, CreationError::PremiumRequired));
    }
    assert_eq!(h.store.row_count(), 0);
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn provider_failure_leaves_counter_and_store_untouched() {
    let h = harness();
    h.text.fail.store(true, Ordering::SeqCst);

    let err = h
        .pipeline
        .run(&free_caller(3), article("rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, CreationError::Provider(_)));
    assert_eq!(h.store.row_count(), 0);
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn store_failure_leaves_counter_untouched() {
    let h = harness();
    h.store.fail_inserts.store(true, Ordering::SeqCst);

    let err = h
        .pipeline
        .run(&free_caller(0), article("rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, CreationError::Persistence(_)));
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn counter_advance_failure_does_not_fail_the_request() {
    let h = harness();
    h.identity.fail_increment.store(true, Ordering::SeqCst);

    let creation = h.pipeline.run(&free_caller(0), article("rust")).await.unwrap();
    assert_eq!(creation.content, "generated text");
    assert_eq!(h.store.row_count(), 1);
}

//=========================================================================================
// Validation
//=========================================================================================

#[tokio::test]
async fn oversized_resume_rejected_before_any_provider_call() {
    let h = harness();
    let request = GenerationRequest::ResumeReview {
        resume: vec![0u8; 5 * 1024 * 1024 + 1],
    };

    let err = h.pipeline.run(&free_caller(0), request).await.unwrap_err();
    assert!(matches!(err, CreationError::Validation(_)));
    assert_eq!(err.to_string(), "Resume file size exceeds allowed size (5MB).");
    assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_topic_rejected() {
    let h = harness();
    let err = h
        .pipeline
        .run(&free_caller(0), article("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, CreationError::Validation(_)));
    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn empty_provider_output_is_a_provider_error() {
    let h = harness();
    *h.text.reply.lock().unwrap() = "   ".to_string();

    let err = h
        .pipeline
        .run(&free_caller(0), article("rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, CreationError::Provider(_)));
    assert_eq!(h.store.row_count(), 0);
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 0);
}

//=========================================================================================
// Dispatch
//=========================================================================================

#[tokio::test]
async fn article_prompt_and_length_are_forwarded() {
    let h = harness();
    h.pipeline
        .run(
            &free_caller(0),
            GenerationRequest::Article {
                topic: "borrow checking".to_string(),
                length: 1200,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        h.text.last_prompt.lock().unwrap().as_deref(),
        Some("Generate an article about borrow checking")
    );
    assert_eq!(h.text.last_max_tokens.load(Ordering::SeqCst), 1200);
}

#[tokio::test]
async fn article_length_is_clamped_to_the_ceiling() {
    let h = harness();
    h.pipeline
        .run(
            &free_caller(0),
            GenerationRequest::Article {
                topic: "macros".to_string(),
                length: 99_999,
            },
        )
        .await
        .unwrap();
    assert_eq!(h.text.last_max_tokens.load(Ordering::SeqCst), 1600);
}

#[tokio::test]
async fn blog_title_prompt_embeds_the_category() {
    let h = harness();
    h.pipeline
        .run(
            &free_caller(0),
            GenerationRequest::BlogTitle {
                topic: "async runtimes".to_string(),
                category: "Technology".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        h.text.last_prompt.lock().unwrap().as_deref(),
        Some(
            "Suggest some relevant blog title for the category \"Technology\" based on the topic : async runtimes"
        )
    );
}

#[tokio::test]
async fn resume_review_embeds_extracted_text_and_stores_fixed_prompt() {
    let h = harness();
    let creation = h
        .pipeline
        .run(
            &free_caller(0),
            GenerationRequest::ResumeReview {
                resume: vec![b'%', b'P', b'D', b'F'],
            },
        )
        .await
        .unwrap();

    let sent = h.text.last_prompt.lock().unwrap().clone().unwrap();
    assert!(sent.contains("Jane Doe. Ten years of systems programming."));
    assert_eq!(h.text.last_max_tokens.load(Ordering::SeqCst), 1000);
    assert_eq!(creation.prompt, "Review the uploaded resume");
    assert_eq!(creation.kind, CreationKind::ResumeReview);
}

#[tokio::test]
async fn image_generation_stores_a_media_url() {
    let h = harness();
    let creation = h
        .pipeline
        .run(
            &premium_caller(),
            GenerationRequest::Image {
                prompt: "cat".to_string(),
                style: "Anime style".to_string(),
                publish: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        h.images.last_prompt.lock().unwrap().as_deref(),
        Some("Generate a Anime style style image of cat")
    );
    assert!(creation.content.starts_with("https://cdn.example.com/media/"));
    assert!(creation.publish);
    assert_eq!(creation.prompt, "cat");
    assert_eq!(h.media.stored.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn object_removal_stores_the_instruction_as_prompt() {
    let h = harness();
    let creation = h
        .pipeline
        .run(
            &premium_caller(),
            GenerationRequest::RemoveObject {
                image: vec![1, 2, 3],
                object: "scissors".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(creation.prompt, "Remove the scissors from the image");
    assert_eq!(creation.kind, CreationKind::Image);
    assert!(!creation.publish);
    assert_eq!(
        h.image_edit.last_instruction.lock().unwrap().as_deref(),
        Some("Remove the scissors from the image")
    );
}

//=========================================================================================
// Listings
//=========================================================================================

#[tokio::test]
async fn listings_are_newest_first_and_respect_visibility() {
    let h = harness();
    h.pipeline.run(&premium_caller(), article("one")).await.unwrap();
    h.pipeline
        .run(
            &premium_caller(),
            GenerationRequest::Image {
                prompt: "two".to_string(),
                style: "Realistic style".to_string(),
                publish: true,
            },
        )
        .await
        .unwrap();
    h.pipeline.run(&premium_caller(), article("three")).await.unwrap();

    let mine = h.pipeline.creations_for("user_premium").await.unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(mine[0].prompt, "three");

    let published = h.pipeline.published_creations().await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].prompt, "two");
    assert!(published.iter().all(|c| c.publish));
}

//=========================================================================================
// Like toggling
//=========================================================================================

#[tokio::test]
async fn toggling_flips_membership_exactly_once_each_time() {
    let h = harness();
    let creation = h.pipeline.run(&premium_caller(), article("likeable")).await.unwrap();

    let outcome = h.pipeline.toggle_like(creation.id, "user_a").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Liked);
    assert_eq!(outcome.message(), "Creation Liked");
    assert_eq!(h.store.liked_by(creation.id), vec!["user_a".to_string()]);

    let outcome = h.pipeline.toggle_like(creation.id, "user_a").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Unliked);
    assert_eq!(outcome.message(), "Creation Unliked");
    assert!(h.store.liked_by(creation.id).is_empty());
}

#[tokio::test]
async fn toggle_never_duplicates_a_user() {
    let h = harness();
    let creation = h.pipeline.run(&premium_caller(), article("likeable")).await.unwrap();

    h.pipeline.toggle_like(creation.id, "user_a").await.unwrap();
    h.pipeline.toggle_like(creation.id, "user_b").await.unwrap();
    h.pipeline.toggle_like(creation.id, "user_a").await.unwrap();
    h.pipeline.toggle_like(creation.id, "user_a").await.unwrap();

    let likes = h.store.liked_by(creation.id);
    assert_eq!(likes.iter().filter(|u| u.as_str() == "user_a").count(), 1);
    assert_eq!(likes.iter().filter(|u| u.as_str() == "user_b").count(), 1);
}

#[tokio::test]
async fn toggle_retries_through_conflicting_writers() {
    let h = harness();
    let creation = h.pipeline.run(&premium_caller(), article("contended")).await.unwrap();

    // The next two CAS attempts lose to a simulated concurrent writer.
    h.store.conflicts.store(2, Ordering::SeqCst);

    let outcome = h.pipeline.toggle_like(creation.id, "user_a").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Liked);
    let likes = h.store.liked_by(creation.id);
    assert_eq!(likes.iter().filter(|u| u.as_str() == "user_a").count(), 1);
}

#[tokio::test]
async fn toggling_a_missing_creation_is_not_found() {
    let h = harness();
    let err = h
        .pipeline
        .toggle_like(Uuid::new_v4(), "user_a")
        .await
        .unwrap_err();
    assert!(matches!(err, CreationError::NotFound(_)));
    assert_eq!(err.to_string(), "Creation not found");
}

//=========================================================================================
// End-to-end scenarios
//=========================================================================================

#[tokio::test]
async fn free_user_at_nine_generates_then_hits_the_limit() {
    let h = harness();
    h.identity.usage.store(9, Ordering::SeqCst);

    let creation = h
        .pipeline
        .run(
            &free_caller(9),
            GenerationRequest::Article {
                topic: "X".to_string(),
                length: 800,
            },
        )
        .await
        .unwrap();
    assert_eq!(creation.kind, CreationKind::Article);
    assert_eq!(creation.content, "generated text");
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 10);

    let err = h
        .pipeline
        .run(&free_caller(10), article("X"))
        .await
        .unwrap_err();
    assert!(matches!(err, CreationError::QuotaExceeded));
    assert_eq!(h.store.row_count(), 1);
    assert_eq!(h.identity.usage.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn published_image_shows_up_in_both_listings() {
    let h = harness();
    let creation = h
        .pipeline
        .run(
            &premium_caller(),
            GenerationRequest::Image {
                prompt: "cat".to_string(),
                style: "Anime style".to_string(),
                publish: true,
            },
        )
        .await
        .unwrap();

    assert!(creation.publish);
    let mine = h.pipeline.creations_for("user_premium").await.unwrap();
    let published = h.pipeline.published_creations().await.unwrap();
    assert!(mine.iter().any(|c| c.id == creation.id));
    assert!(published.iter().any(|c| c.id == creation.id));
}
