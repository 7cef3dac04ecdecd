//! Document processing pipeline: OCR, summarization, and the timeout policy around them.

mod service;
pub mod types;

pub use service::{DocumentApi, DocumentService};
pub use types::{ProcessingError, UpstreamCall};
