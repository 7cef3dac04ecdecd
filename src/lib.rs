#![deny(missing_docs)]

//! Core library for the OCR summary backend.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Multipart upload handling.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// OCR and summarization counters.
pub mod metrics;
/// Document analysis client abstraction and adapters.
pub mod ocr;
/// OCR and summarization orchestration.
pub mod processing;
/// Chat completion client abstraction and adapters.
pub mod summarization;
