//! Error definitions for the processing pipeline.

use crate::{ocr::OcrClientError, summarization::SummarizationClientError};
use std::time::Duration;
use thiserror::Error;

/// Vendor call guarded by the upstream timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCall {
    /// Document analysis.
    Ocr,
    /// Chat completion.
    Summarization,
}

impl std::fmt::Display for UpstreamCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ocr => f.write_str("document analysis"),
            Self::Summarization => f.write_str("summarization"),
        }
    }
}

/// Errors emitted by the document processing pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// OCR backend failed to analyze the document.
    #[error("OCR request failed: {0}")]
    Ocr(#[from] OcrClientError),
    /// Summarization provider failed to produce a completion.
    #[error("Summarization request failed: {0}")]
    Summarization(#[from] SummarizationClientError),
    /// Vendor call did not settle within the configured timeout.
    #[error("{call} timed out after {}s", .timeout.as_secs_f32())]
    Timeout {
        /// Call that timed out.
        call: UpstreamCall,
        /// Timeout that elapsed.
        timeout: Duration,
    },
}
