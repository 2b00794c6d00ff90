//! Business logic services for the marketing-site backend.
//!
//! This module contains the model gateway, prompt construction, response
//! normalization, and the collaborator services for email delivery and
//! file text extraction.

pub mod anthropic;
pub mod email;
pub mod extract;
pub mod normalize;
pub mod prompts;

// Re-export commonly used types
pub use anthropic::{AnthropicClient, ChatMessage, CompletionRequest, Role, StreamEvent};
pub use email::{EmailSender, InquiryNotification};
pub use extract::FileKind;
pub use normalize::extract_json_object;
pub use prompts::{Prompt, CHAT_SYSTEM_PROMPT};
