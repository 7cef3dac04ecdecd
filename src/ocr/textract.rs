//! AWS Textract backend for the OCR adapter.

use super::{BlockKind, DocumentBlock, OcrClient, OcrClientError};
use crate::config::Config;
use async_trait::async_trait;
use aws_sdk_textract::{
    Client,
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::Blob,
    types::{Block, Document, FeatureType},
};

/// Feature types requested on every analysis call.
///
/// Only `LINE` blocks are read back, so FORMS and TABLES currently affect nothing but the
/// backend's own segmentation.
const FEATURE_TYPES: [FeatureType; 2] = [FeatureType::Forms, FeatureType::Tables];

/// Textract `AnalyzeDocument` client built from static credentials.
pub struct TextractOcrClient {
    client: Client,
}

impl TextractOcrClient {
    /// Build a client from the region, credential pair, and optional endpoint in `config`.
    pub fn new(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key,
            &config.aws_secret_key,
            None,
            None,
            "ocr-summary",
        );

        let mut builder = aws_sdk_textract::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.aws_region.clone()))
            .behavior_version_latest();

        if let Some(endpoint) = &config.textract_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::debug!(
            region = %config.aws_region,
            endpoint = ?config.textract_endpoint,
            "Initialized Textract client"
        );

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl OcrClient for TextractOcrClient {
    async fn analyze_document(
        &self,
        bytes: Vec<u8>,
    ) -> Result<Vec<DocumentBlock>, OcrClientError> {
        let document = Document::builder().bytes(Blob::new(bytes)).build();

        let output = self
            .client
            .analyze_document()
            .document(document)
            .set_feature_types(Some(FEATURE_TYPES.to_vec()))
            .send()
            .await
            .map_err(|error| {
                OcrClientError::AnalysisFailed(DisplayErrorContext(&error).to_string())
            })?;

        Ok(output.blocks().iter().map(to_document_block).collect())
    }
}

fn to_document_block(block: &Block) -> DocumentBlock {
    DocumentBlock {
        kind: block
            .block_type()
            .map(|kind| BlockKind::from(kind.as_str()))
            .unwrap_or_else(|| BlockKind::Other(String::new())),
        text: block.text().map(str::to_string),
    }
}
