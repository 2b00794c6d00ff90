//! API layer for the site server.
//!
//! This module contains the HTTP handlers, request/response models, the
//! data-stream translator, and the router assembly.

pub mod handlers;
pub mod models;
pub mod streaming;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::request_id_middleware;

// Re-export commonly used types
pub use handlers::AppState;
pub use models::{
    AnalysisResponse, ChatRequest, ClassificationResponse, DocumentRequest, EmailTriageRequest,
    ExtractResponse, InquiryRequest, InvoiceRequest, SystemsDemoResponse, SystemsQueryRequest,
};
pub use streaming::data_stream_response;

/// Upload bodies larger than this are rejected before extraction runs.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Assemble the application router: endpoint routes, request-id scoping,
/// permissive CORS for the site front-end, and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/classify", post(handlers::classify))
        .route("/api/demo-document", post(handlers::demo_document))
        .route("/api/demo-email", post(handlers::demo_email))
        .route("/api/invoice-parse", post(handlers::invoice_parse))
        .route("/api/extract-text", post(handlers::extract_text))
        .route("/api/mcp-demo", post(handlers::mcp_demo))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
