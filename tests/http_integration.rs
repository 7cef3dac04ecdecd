use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use httpmock::{Method::POST, MockServer};
use ocr_summary::{
    api,
    config::Config,
    ocr::{BlockKind, DocumentBlock, OcrClient, OcrClientError},
    processing::DocumentService,
    summarization::OpenAiSummarizationClient,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "integration-boundary";

struct FixedBlocks(Result<Vec<DocumentBlock>, String>);

#[async_trait]
impl OcrClient for FixedBlocks {
    async fn analyze_document(
        &self,
        _bytes: Vec<u8>,
    ) -> Result<Vec<DocumentBlock>, OcrClientError> {
        self.0.clone().map_err(OcrClientError::AnalysisFailed)
    }
}

/// Answers only after `.0` has elapsed.
struct SlowBlocks(Duration);

#[async_trait]
impl OcrClient for SlowBlocks {
    async fn analyze_document(
        &self,
        _bytes: Vec<u8>,
    ) -> Result<Vec<DocumentBlock>, OcrClientError> {
        tokio::time::sleep(self.0).await;
        Ok(vec![DocumentBlock::line("late")])
    }
}

fn test_config(base_url: String) -> Config {
    Config::from_lookup(|key| match key {
        "AWS_REGION" => Some("us-east-1".into()),
        "AWS_ACCESS_KEY" => Some("AKIDEXAMPLE".into()),
        "AWS_SECRET_KEY" => Some("secret".into()),
        "OPENAI_API_KEY" => Some("sk-integration".into()),
        "OPENAI_BASE_URL" => Some(base_url.clone()),
        "UPSTREAM_TIMEOUT_SECS" => Some("5".into()),
        _ => None,
    })
    .expect("config")
}

fn app(server: &MockServer, ocr: FixedBlocks) -> Router {
    app_with(server, ocr, Duration::from_secs(5), 1024 * 1024)
}

fn app_with(
    server: &MockServer,
    ocr: impl OcrClient + 'static,
    upstream_timeout: Duration,
    max_upload_bytes: usize,
) -> Router {
    let config = test_config(server.base_url());
    let summarizer = OpenAiSummarizationClient::new(&config).expect("summarization client");
    let service = DocumentService::with_clients(
        Arc::new(ocr),
        Arc::new(summarizer),
        config.openai_model.clone(),
        upstream_timeout,
    );
    api::create_router(Arc::new(service), max_upload_bytes)
}

fn upload_request(field: &str, data: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"page.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

fn summarize_request(text: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/summarize")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": text }).to_string()))
        .expect("request")
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

fn invoice_blocks() -> Vec<DocumentBlock> {
    vec![
        DocumentBlock {
            kind: BlockKind::Page,
            text: None,
        },
        DocumentBlock::line("ACME Corp"),
        DocumentBlock {
            kind: BlockKind::Word,
            text: Some("ACME".into()),
        },
        DocumentBlock::line("Invoice 2024-001"),
        DocumentBlock {
            kind: BlockKind::KeyValueSet,
            text: None,
        },
        DocumentBlock::line("Total due: 120.00"),
        DocumentBlock {
            kind: BlockKind::Cell,
            text: Some("120.00".into()),
        },
    ]
}

#[tokio::test]
async fn upload_then_summarize_round_trip() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-integration")
                .json_body_partial(
                    json!({
                        "model": "gpt-3.5-turbo",
                        "messages": [
                            {
                                "role": "system",
                                "content": "You're an OCR summary assistant. Clean and summarize the extracted text."
                            },
                            {
                                "role": "user",
                                "content": "Summarize this OCR result:\n\nACME Corp\nInvoice 2024-001\nTotal due: 120.00"
                            }
                        ],
                        "temperature": 0.5,
                        "max_tokens": 200
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "ACME invoice 2024-001 for 120.00." },
                    "finish_reason": "stop"
                }]
            }));
        })
        .await;
    let app = app(&server, FixedBlocks(Ok(invoice_blocks())));

    let upload = app
        .clone()
        .oneshot(upload_request("document", b"\xff\xd8\xff jpeg bytes"))
        .await
        .expect("upload response");
    assert_eq!(upload.status(), StatusCode::OK);
    let upload_json: Value = serde_json::from_slice(&read_body(upload).await).expect("json");
    let text = upload_json["text"].as_str().expect("text field").to_string();
    assert_eq!(text, "ACME Corp\nInvoice 2024-001\nTotal due: 120.00");

    let summary = app
        .clone()
        .oneshot(summarize_request(&text))
        .await
        .expect("summarize response");
    assert_eq!(summary.status(), StatusCode::OK);
    let summary_json: Value = serde_json::from_slice(&read_body(summary).await).expect("json");
    assert_eq!(
        summary_json,
        json!({ "summary": "ACME invoice 2024-001 for 120.00." })
    );
    completion.assert_async().await;

    let metrics = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("metrics response");
    let metrics_json: Value = serde_json::from_slice(&read_body(metrics).await).expect("json");
    assert_eq!(metrics_json["documents_processed"], 1);
    assert_eq!(metrics_json["lines_extracted"], 3);
    assert_eq!(metrics_json["summaries_generated"], 1);
}

#[tokio::test]
async fn missing_file_never_reaches_ocr() {
    let server = MockServer::start_async().await;
    let app = app(&server, FixedBlocks(Err("should not be called".into())));

    let response = app
        .oneshot(upload_request("file", b"bytes"))
        .await
        .expect("upload response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_body(response).await, b"No file uploaded");
}

#[tokio::test]
async fn ocr_failure_is_reported_as_textract_failed() {
    let server = MockServer::start_async().await;
    let app = app(
        &server,
        FixedBlocks(Err("UnsupportedDocumentException".into())),
    );

    let response = app
        .oneshot(upload_request("document", b"garbage"))
        .await
        .expect("upload response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_body(response).await, b"Textract failed");
}

#[tokio::test]
async fn provider_error_is_reported_as_summarization_failed() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401)
                .json_body(json!({ "error": { "message": "Incorrect API key provided" } }));
        })
        .await;
    let app = app(&server, FixedBlocks(Ok(vec![])));

    let response = app
        .oneshot(summarize_request("some text"))
        .await
        .expect("summarize response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_body(response).await, b"Summarization failed");
    completion.assert_async().await;
}

#[tokio::test]
async fn empty_document_yields_empty_text() {
    let server = MockServer::start_async().await;
    let app = app(&server, FixedBlocks(Ok(vec![])));

    let response = app
        .oneshot(upload_request("document", b""))
        .await
        .expect("upload response");

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&read_body(response).await).expect("json");
    assert_eq!(json, json!({ "text": "" }));
}

#[tokio::test]
async fn slow_ocr_is_reported_as_textract_failed() {
    let server = MockServer::start_async().await;
    let app = app_with(
        &server,
        SlowBlocks(Duration::from_secs(30)),
        Duration::from_millis(50),
        1024 * 1024,
    );

    let response = app
        .clone()
        .oneshot(upload_request("document", b"page"))
        .await
        .expect("upload response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_body(response).await, b"Textract failed");

    let metrics = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("metrics response");
    let metrics_json: Value = serde_json::from_slice(&read_body(metrics).await).expect("json");
    assert_eq!(metrics_json["ocr_failures"], 1);
    assert_eq!(metrics_json["documents_processed"], 0);
}

#[tokio::test]
async fn slow_provider_is_reported_as_summarization_failed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "too late" } }]
                }));
        })
        .await;
    let app = app_with(
        &server,
        FixedBlocks(Ok(vec![])),
        Duration::from_millis(50),
        1024 * 1024,
    );

    let response = app
        .oneshot(summarize_request("some text"))
        .await
        .expect("summarize response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_body(response).await, b"Summarization failed");
}

#[tokio::test]
async fn upload_over_size_limit_is_reported_as_textract_failed() {
    let server = MockServer::start_async().await;
    let app = app_with(
        &server,
        FixedBlocks(Ok(invoice_blocks())),
        Duration::from_secs(5),
        1024,
    );

    let response = app
        .oneshot(upload_request("document", &[0u8; 4096]))
        .await
        .expect("upload response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_body(response).await, b"Textract failed");
}
