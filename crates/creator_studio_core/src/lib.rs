pub mod domain;
pub mod error;
pub mod likes;
pub mod pipeline;
pub mod ports;
pub mod quota;

pub use domain::{CallerContext, Creation, CreationKind, NewCreation, Plan};
pub use error::CreationError;
pub use likes::LikeOutcome;
pub use pipeline::{CreationPipeline, GeneratedContent, GenerationRequest, PipelineLimits};
pub use ports::{
    CreationStore, DocumentExtractionService, IdentityService, ImageEditService,
    ImageGenerationService, MediaStorageService, PortError, PortResult, TextGenerationService,
};
pub use quota::{OperationClass, QuotaPolicy};

#[cfg(test)]
mod tests;
