//! HTTP request handlers for the site API.
//!
//! Every model-backed handler runs the same sequence: quota check, input
//! validation, prompt construction, one upstream call, response shaping.
//! Handler-level failures answer with the endpoint's fixed client-safe
//! message; the detail goes to the log.

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::models::*;
use crate::api::streaming::data_stream_response;
use crate::core::logging::get_request_id;
use crate::core::{AppConfig, AppError, RateLimiter, Result};
use crate::services::prompts::{self, systems_demo_system_prompt};
use crate::services::{
    extract, extract_json_object, AnthropicClient, CompletionRequest, EmailSender, FileKind,
    InquiryNotification, Prompt, CHAT_SYSTEM_PROMPT,
};

/// Longest accepted conversation, in messages.
const MAX_CHAT_MESSAGES: usize = 40;

/// Extracted upload text is capped at this many characters.
const EXTRACT_RESPONSE_CHARS: usize = 10_000;

const QUOTA_MESSAGE: &str = "Rate limit exceeded.";
const CHAT_QUOTA_MESSAGE: &str = "Rate limit exceeded. Please try again tomorrow.";

/// Shared application state.
pub struct AppState {
    pub gateway: AnthropicClient,
    pub mailer: Option<EmailSender>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Assemble the shared state from configuration and one HTTP client.
    pub fn new(config: &AppConfig, http: reqwest::Client) -> Self {
        let gateway = AnthropicClient::new(http.clone(), config.anthropic.clone());
        let mailer = config
            .email
            .clone()
            .map(|email| EmailSender::new(http, email));

        Self {
            gateway,
            mailer,
            limiter: RateLimiter::new(config.rate_limit_window),
        }
    }
}

/// Handle streaming chat with the site assistant.
#[tracing::instrument(skip_all, fields(message_count = payload.messages.len()))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> Result<Response> {
    check_quota(&state, &headers, None, 100, CHAT_QUOTA_MESSAGE)?;

    if payload.messages.is_empty() || payload.messages.len() > MAX_CHAT_MESSAGES {
        return Err(AppError::Validation(
            "Conversation too long. Please start a new chat.".to_string(),
        ));
    }

    let request = CompletionRequest {
        system: Some(CHAT_SYSTEM_PROMPT.to_string()),
        messages: payload.messages,
        max_tokens: 500,
    };

    // Connection and status failures surface here, before the response
    // starts; mid-stream failures abort the body inside the translator.
    let deltas = state.gateway.stream(&request).await?;

    Ok(data_stream_response(deltas))
}

/// Handle contact-form inquiry classification.
///
/// The sales notification email is awaited inline before the response is
/// returned; a delivery failure is logged and never fails the request.
#[tracing::instrument(skip_all)]
pub async fn classify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<InquiryRequest>,
) -> Result<Json<ClassificationResponse>> {
    check_quota(&state, &headers, Some("classify"), 20, QUOTA_MESSAGE)?;

    if payload.description.trim().chars().count() < 10 {
        return Err(AppError::Validation("Description too short.".to_string()));
    }

    let prompt = Prompt::InquiryClassification {
        name: &payload.name,
        email: &payload.email,
        company: &payload.company,
        description: &payload.description,
    }
    .render();

    let classification = run_structured(
        &state,
        CompletionRequest::user_prompt(prompt, 500),
        "classify",
        "Classification failed.",
    )
    .await?;

    if let Some(mailer) = &state.mailer {
        let notification = InquiryNotification {
            name: &payload.name,
            email: &payload.email,
            company: &payload.company,
            description: &payload.description,
            classification: &classification,
        };
        if let Err(err) = mailer.send_inquiry(&notification).await {
            tracing::error!(
                request_id = %get_request_id(),
                error = %format!("{err:#}"),
                "inquiry notification failed"
            );
        }
    }

    Ok(Json(ClassificationResponse { classification }))
}

/// Handle the document-classification demo.
#[tracing::instrument(skip_all)]
pub async fn demo_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<DocumentRequest>,
) -> Result<Json<AnalysisResponse>> {
    check_quota(&state, &headers, Some("demo-doc"), 30, QUOTA_MESSAGE)?;

    if payload.text.trim().chars().count() < 20 {
        return Err(AppError::Validation("Document too short.".to_string()));
    }

    let prompt = Prompt::DocumentClassification {
        text: &payload.text,
    }
    .render();

    let result = run_structured(
        &state,
        CompletionRequest::user_prompt(prompt, 700),
        "demo-document",
        "Analysis failed.",
    )
    .await?;

    Ok(Json(AnalysisResponse { result }))
}

/// Handle the email-triage demo.
#[tracing::instrument(skip_all)]
pub async fn demo_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EmailTriageRequest>,
) -> Result<Json<AnalysisResponse>> {
    check_quota(&state, &headers, Some("demo-email"), 30, QUOTA_MESSAGE)?;

    if payload.email.trim().chars().count() < 10 {
        return Err(AppError::Validation("Email too short.".to_string()));
    }

    let prompt = Prompt::EmailTriage {
        email: &payload.email,
    }
    .render();

    let result = run_structured(
        &state,
        CompletionRequest::user_prompt(prompt, 600),
        "demo-email",
        "Analysis failed.",
    )
    .await?;

    Ok(Json(AnalysisResponse { result }))
}

/// Handle the invoice field-extraction demo.
#[tracing::instrument(skip_all)]
pub async fn invoice_parse(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<InvoiceRequest>,
) -> Result<Json<AnalysisResponse>> {
    check_quota(&state, &headers, Some("invoice"), 30, QUOTA_MESSAGE)?;

    if payload.text.trim().chars().count() < 20 {
        return Err(AppError::Validation("Invoice text too short.".to_string()));
    }

    let prompt = Prompt::InvoiceExtraction {
        text: &payload.text,
    }
    .render();

    let result = run_structured(
        &state,
        CompletionRequest::user_prompt(prompt, 700),
        "invoice-parse",
        "Extraction failed.",
    )
    .await?;

    Ok(Json(AnalysisResponse { result }))
}

static MCP_CALLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<mcp_calls>(.*?)</mcp_calls>").unwrap());

/// Handle the simulated enterprise-systems demo.
///
/// The model is asked to append an `<mcp_calls>` block naming the tools it
/// consulted; an absent or unparseable block falls back to a generic trace
/// rather than failing the request.
#[tracing::instrument(skip_all)]
pub async fn mcp_demo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SystemsQueryRequest>,
) -> Result<Json<SystemsDemoResponse>> {
    check_quota(&state, &headers, Some("mcp-demo"), 20, QUOTA_MESSAGE)?;

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query required.".to_string()));
    }

    let mut request = CompletionRequest::user_prompt(query.to_string(), 400);
    request.system = Some(systems_demo_system_prompt().to_string());

    let full_text = state
        .gateway
        .complete(&request)
        .await
        .map_err(|err| operation_failed("mcp-demo", err, "Demo failed."))?;

    let mcp_calls = MCP_CALLS
        .captures(&full_text)
        .and_then(|captures| serde_json::from_str::<Value>(captures[1].trim()).ok())
        .unwrap_or_else(|| json!({ "tools": ["Enterprise System"], "system": "Enterprise" }));

    let answer = MCP_CALLS.replace(&full_text, "").trim().to_string();

    Ok(Json(SystemsDemoResponse { answer, mcp_calls }))
}

/// Handle file uploads for text extraction.
///
/// The `file` field is read fully into memory; extraction runs on the
/// blocking pool since the PDF parser is CPU-bound.
#[tracing::instrument(skip_all)]
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut form: Multipart,
) -> Result<Json<ExtractResponse>> {
    check_quota(&state, &headers, Some("extract"), 30, QUOTA_MESSAGE)?;

    let mut upload = None;
    while let Some(field) = form
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Invalid form data: {err}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|err| AppError::Validation(format!("Invalid form data: {err}")))?;
            upload = Some((file_name, content_type, data));
            break;
        }
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("No file provided.".to_string()))?;

    let kind = FileKind::detect(&file_name, &content_type).ok_or_else(|| {
        AppError::UnsupportedInput(
            "Unsupported file type. Please upload a PDF, Word document, or text file.".to_string(),
        )
    })?;

    let text = match tokio::task::spawn_blocking(move || extract::extract_text(kind, &data)).await
    {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            tracing::error!(
                request_id = %get_request_id(),
                file = %file_name,
                error = %format!("{err:#}"),
                "file extraction failed"
            );
            return Err(AppError::OperationFailed(format!(
                "Failed to process file: {err:#}"
            )));
        }
        Err(err) => {
            tracing::error!(request_id = %get_request_id(), error = %err, "extraction task failed");
            return Err(AppError::OperationFailed(
                "Failed to process file: extraction task failed".to_string(),
            ));
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::UnsupportedInput(
            "Could not extract text from file. The file may be empty or image-based.".to_string(),
        ));
    }

    Ok(Json(ExtractResponse {
        text: prompts::truncate_chars(&text, EXTRACT_RESPONSE_CHARS).to_string(),
    }))
}

/// Basic health check endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// One single-shot completion whose reply must contain a JSON object.
async fn run_structured(
    state: &AppState,
    request: CompletionRequest,
    endpoint: &str,
    failure: &str,
) -> Result<Value> {
    let reply = state
        .gateway
        .complete(&request)
        .await
        .map_err(|err| operation_failed(endpoint, err, failure))?;

    extract_json_object(&reply).map_err(|err| operation_failed(endpoint, err, failure))
}

/// Log the detailed failure and produce the endpoint's client-safe error.
fn operation_failed(endpoint: &str, err: AppError, message: &str) -> AppError {
    tracing::error!(
        request_id = %get_request_id(),
        endpoint = endpoint,
        error = %err,
        "model-backed operation failed"
    );
    AppError::OperationFailed(message.to_string())
}

/// Enforce the per-client daily quota for one endpoint scope. The chat
/// endpoint passes no scope and keys on the bare client address.
fn check_quota(
    state: &AppState,
    headers: &HeaderMap,
    scope: Option<&str>,
    limit: u32,
    message: &str,
) -> Result<()> {
    let ip = client_ip(headers);
    let key = match scope {
        Some(scope) => format!("{scope}:{ip}"),
        None => ip,
    };

    let decision = state.limiter.check(&key, limit);
    if !decision.allowed {
        tracing::warn!(request_id = %get_request_id(), key = %key, "daily quota exhausted");
        return Err(AppError::QuotaExceeded(message.to_string()));
    }

    Ok(())
}

/// Client address from the forwarding header: first entry, trimmed. Requests
/// with no usable header share one fallback bucket.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
