//! Core functionality for the site API server.
//!
//! This module contains fundamental components used throughout the application:
//! - Configuration management
//! - Error handling
//! - Rate limiting
//! - Request-id logging

pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limiter;

// Re-export commonly used types
pub use config::{AnthropicConfig, AppConfig, EmailConfig};
pub use error::{AppError, Result};
pub use logging::{generate_request_id, get_request_id, request_id_middleware, REQUEST_ID};
pub use rate_limiter::{RateLimitDecision, RateLimiter};
