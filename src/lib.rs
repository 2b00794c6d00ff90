//! Tioga AI site API server
//!
//! This library backs the AI-facing endpoints of the Tioga AI marketing site:
//!
//! - **Chat**: streaming site assistant, translated to the line-delimited
//!   data-stream format the web client parses incrementally
//! - **Inquiry classification**: contact-form triage with a notification email
//!   to the sales inbox
//! - **Interactive demos**: document classification, email triage, invoice
//!   extraction, and a simulated enterprise-systems query
//! - **Upload extraction**: plain-text recovery from PDF / Word / text uploads
//!
//! Every AI-backed endpoint shares the same gating layer: a per-client
//! fixed-window rate limiter, prompt templates with bounded embedded content,
//! and a tolerant JSON normalizer for free-form model output.
//!
//! # Architecture
//!
//! - [`core`]: config, errors, rate limiting, request-id logging
//! - [`services`]: the Anthropic gateway, prompt builder, response normalizer,
//!   notification email, and upload text extraction
//! - [`api`]: HTTP handlers, request/response models, stream translation
//!
//! # Configuration
//!
//! Required environment variables:
//! - `ANTHROPIC_API_KEY`: upstream model API key
//!
//! Optional environment variables:
//! - `HOST`: server bind address (default: 0.0.0.0)
//! - `PORT`: server port (default: 8080)
//! - `ANTHROPIC_BASE_URL`: upstream base URL (default: https://api.anthropic.com)
//! - `ANTHROPIC_MODEL`: model id used for every endpoint
//! - `UPSTREAM_TIMEOUT_SECS`: per-call upstream timeout (default: 120)
//! - `RATE_LIMIT_WINDOW_SECS`: quota window length (default: 86400)
//! - `EMAIL_API_KEY`, `EMAIL_FROM`, `INQUIRY_RECIPIENT`, `EMAIL_API_BASE`:
//!   inquiry notification email; the sender is disabled when unset

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use api::{build_router, AppState};
pub use core::{AppConfig, AppError, RateLimiter, Result};
pub use services::AnthropicClient;
