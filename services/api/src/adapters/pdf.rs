//! services/api/src/adapters/pdf.rs
//!
//! This module contains the adapter for document text extraction, implementing
//! the `DocumentExtractionService` port. Only PDF resumes pass through here.

use async_trait::async_trait;

use creator_studio_core::ports::{DocumentExtractionService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentExtractionService` with `pdf-extract`.
#[derive(Clone, Default)]
pub struct PdfExtractAdapter;

impl PdfExtractAdapter {
    /// Creates a new `PdfExtractAdapter`.
    pub fn new() -> Self {
        Self
    }
}

//=========================================================================================
// `DocumentExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentExtractionService for PdfExtractAdapter {
    async fn extract_text(&self, document: &[u8]) -> PortResult<String> {
        // Parsing is CPU-bound; keep it off the async worker threads.
        let document = document.to_vec();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&document)
        })
        .await
        .map_err(|e| PortError::Unexpected(format!("extraction task failed: {e}")))?
        .map_err(|e| PortError::Unexpected(format!("could not parse the PDF: {e}")))?;

        if text.trim().is_empty() {
            return Err(PortError::Unexpected(
                "the PDF contains no extractable text".to_string(),
            ));
        }
        Ok(text)
    }
}
