use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing OCR and summarization activity.
#[derive(Default)]
pub struct ServiceMetrics {
    documents_processed: AtomicU64,
    lines_extracted: AtomicU64,
    summaries_generated: AtomicU64,
    ocr_failures: AtomicU64,
    summarization_failures: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that went through OCR and the number of lines it produced.
    pub fn record_document(&self, line_count: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.lines_extracted.fetch_add(line_count, Ordering::Relaxed);
    }

    /// Record a completed summary.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed OCR call.
    pub fn record_ocr_failure(&self) {
        self.ocr_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed summarization call.
    pub fn record_summarization_failure(&self) {
        self.summarization_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            lines_extracted: self.lines_extracted.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            ocr_failures: self.ocr_failures.load(Ordering::Relaxed),
            summarization_failures: self.summarization_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of service counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents successfully run through OCR since startup.
    pub documents_processed: u64,
    /// Total LINE blocks returned across all processed documents.
    pub lines_extracted: u64,
    /// Summaries successfully generated since startup.
    pub summaries_generated: u64,
    /// OCR calls that failed or timed out.
    pub ocr_failures: u64,
    /// Summarization calls that failed or timed out.
    pub summarization_failures: u64,
}
