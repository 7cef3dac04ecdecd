//! OCR adapter: document analysis client abstraction and the block-to-text reduction.
//!
//! The analysis backend returns a flat list of typed blocks. Only `LINE` blocks make it into
//! the extracted text; every other block type is dropped by [`extract_lines`].

mod textract;

use async_trait::async_trait;
use thiserror::Error;

pub use textract::TextractOcrClient;

/// Errors raised by document analysis backends.
#[derive(Debug, Error)]
pub enum OcrClientError {
    /// Backend rejected the document or could not be reached.
    #[error("Document analysis failed: {0}")]
    AnalysisFailed(String),
}

/// Block type discriminator reported by the analysis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// A single line of detected text.
    Line,
    /// A single word.
    Word,
    /// Page container.
    Page,
    /// Table container.
    Table,
    /// Table cell.
    Cell,
    /// Form key or value.
    KeyValueSet,
    /// Checkbox or radio button.
    SelectionElement,
    /// Any other discriminator, kept verbatim.
    Other(String),
}

impl From<&str> for BlockKind {
    fn from(value: &str) -> Self {
        match value {
            "LINE" => Self::Line,
            "WORD" => Self::Word,
            "PAGE" => Self::Page,
            "TABLE" => Self::Table,
            "CELL" => Self::Cell,
            "KEY_VALUE_SET" => Self::KeyValueSet,
            "SELECTION_ELEMENT" => Self::SelectionElement,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Vendor-neutral view of one analysis block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    /// Block type discriminator.
    pub kind: BlockKind,
    /// Text payload, when the block carries one.
    pub text: Option<String>,
}

impl DocumentBlock {
    /// Convenience constructor for a `LINE` block.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Line,
            text: Some(text.into()),
        }
    }
}

/// Interface implemented by document analysis backends.
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Analyze raw document bytes and return the blocks in the order the backend produced them.
    async fn analyze_document(
        &self,
        bytes: Vec<u8>,
    ) -> Result<Vec<DocumentBlock>, OcrClientError>;
}

/// Text reduced from a block list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// `LINE` texts joined with `\n`, in backend order.
    pub text: String,
    /// Number of `LINE` blocks that contributed to `text`.
    pub line_count: usize,
    /// Number of non-line blocks dropped during the reduction.
    pub discarded_blocks: usize,
}

/// Keep only `LINE` blocks and join their text with newlines.
///
/// A line without a text payload contributes an empty line rather than being skipped.
pub fn extract_lines(blocks: &[DocumentBlock]) -> ExtractedText {
    let lines: Vec<&str> = blocks
        .iter()
        .filter(|block| block.kind == BlockKind::Line)
        .map(|block| block.text.as_deref().unwrap_or_default())
        .collect();

    ExtractedText {
        line_count: lines.len(),
        discarded_blocks: blocks.len() - lines.len(),
        text: lines.join("\n"),
    }
}
