//! Processing service coordinating OCR and summarization calls.

use crate::{
    config::Config,
    ingestion::UploadedDocument,
    metrics::{MetricsSnapshot, ServiceMetrics},
    ocr::{ExtractedText, OcrClient, TextractOcrClient, extract_lines},
    processing::types::{ProcessingError, UpstreamCall},
    summarization::{OpenAiSummarizationClient, SummarizationClient, build_summary_request},
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Owns the long-lived OCR and summarization clients shared by every request.
///
/// Each vendor call runs under the same timeout. Construct once near process start and share it
/// through an `Arc`.
pub struct DocumentService {
    ocr_client: Arc<dyn OcrClient>,
    summarization_client: Arc<dyn SummarizationClient>,
    model: String,
    upstream_timeout: Duration,
    metrics: ServiceMetrics,
}

/// Abstraction over the processing pipeline used by the HTTP surface.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Run OCR on an uploaded document and reduce the result to newline-joined lines.
    async fn extract_text(
        &self,
        document: UploadedDocument,
    ) -> Result<ExtractedText, ProcessingError>;

    /// Summarize arbitrary text with the fixed OCR summary prompt.
    async fn summarize(&self, text: &str) -> Result<String, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl DocumentService {
    /// Build the service with Textract and OpenAI clients derived from `config`.
    pub fn new(config: &Config) -> Result<Self, ProcessingError> {
        tracing::info!("Initializing Textract client");
        let ocr_client = Arc::new(TextractOcrClient::new(config));
        tracing::info!("Initializing chat completions client");
        let summarization_client = Arc::new(OpenAiSummarizationClient::new(config)?);

        Ok(Self::with_clients(
            ocr_client,
            summarization_client,
            config.openai_model.clone(),
            config.upstream_timeout,
        ))
    }

    /// Build the service around explicit client implementations.
    pub fn with_clients(
        ocr_client: Arc<dyn OcrClient>,
        summarization_client: Arc<dyn SummarizationClient>,
        model: String,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            ocr_client,
            summarization_client,
            model,
            upstream_timeout,
            metrics: ServiceMetrics::new(),
        }
    }

    async fn with_timeout<T, E, F>(
        &self,
        call: UpstreamCall,
        future: F,
    ) -> Result<T, ProcessingError>
    where
        F: Future<Output = Result<T, E>>,
        ProcessingError: From<E>,
    {
        match tokio::time::timeout(self.upstream_timeout, future).await {
            Ok(result) => result.map_err(ProcessingError::from),
            Err(_) => Err(ProcessingError::Timeout {
                call,
                timeout: self.upstream_timeout,
            }),
        }
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn extract_text(
        &self,
        document: UploadedDocument,
    ) -> Result<ExtractedText, ProcessingError> {
        let size = document.bytes.len();
        tracing::info!(
            file_name = ?document.file_name,
            bytes = size,
            "Analyzing document"
        );

        let blocks = self
            .with_timeout(
                UpstreamCall::Ocr,
                self.ocr_client.analyze_document(document.bytes),
            )
            .await
            .inspect_err(|_| self.metrics.record_ocr_failure())?;

        let extracted = extract_lines(&blocks);
        self.metrics.record_document(extracted.line_count as u64);
        tracing::info!(
            bytes = size,
            lines = extracted.line_count,
            discarded_blocks = extracted.discarded_blocks,
            "Document analyzed"
        );
        Ok(extracted)
    }

    async fn summarize(&self, text: &str) -> Result<String, ProcessingError> {
        tracing::info!(chars = text.chars().count(), model = %self.model, "Summarizing text");
        let request = build_summary_request(&self.model, text);

        let summary = self
            .with_timeout(
                UpstreamCall::Summarization,
                self.summarization_client.complete(request),
            )
            .await
            .inspect_err(|_| self.metrics.record_summarization_failure())?;

        self.metrics.record_summary();
        tracing::info!(chars = summary.chars().count(), "Summary generated");
        Ok(summary)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
