//! Anthropic Messages API gateway.
//!
//! Exactly one upstream call is made per inbound request, in one of two modes:
//! a single-shot completion returning the full reply text, or a streaming
//! completion yielding text deltas in arrival order until an explicit
//! end-of-stream signal. There is no retry logic; failures propagate to the
//! handler that made the call.

use crate::core::config::AnthropicConfig;
use crate::core::error::{AppError, Result};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

/// Messages API version header sent with every call.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upstream error bodies are logged truncated to this many characters.
const MAX_LOGGED_BODY: usize = 500;

/// Conversation role accepted from clients and forwarded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation; the same shape travels inbound from the site
/// client and outbound to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Parameters for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Optional system instruction placed ahead of the conversation.
    pub system: Option<String>,
    /// Ordered conversation turns.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Single user prompt with no system instruction, the shape every
    /// classification endpoint uses.
    pub fn user_prompt(prompt: String, max_tokens: u32) -> Self {
        Self {
            system: None,
            messages: vec![ChatMessage {
                role: Role::User,
                content: prompt,
            }],
            max_tokens,
        }
    }
}

/// Incremental events surfaced to the stream translator.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// One chunk of reply text.
    Delta(String),
    /// Explicit end-of-stream signal; nothing meaningful follows.
    Done,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct MessagesPayload<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// Text of the first text content block, empty when the reply carried none.
    fn reply_text(self) -> String {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Server-sent stream events, discriminated by their `type` tag. Only the
/// delta and stop events matter here; everything else (message_start, ping,
/// block boundaries, usage deltas) is skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: WireDelta },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP gateway to the hosted model.
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(client: reqwest::Client, config: AnthropicConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    fn post_messages(&self, request: &CompletionRequest, stream: bool) -> reqwest::RequestBuilder {
        let payload = MessagesPayload {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            system: request.system.as_deref(),
            messages: &request.messages,
            stream,
        };

        self.client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
    }

    /// Run a single-shot completion and return the reply text.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .post_messages(request, false)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %truncate_detail(&body),
                "upstream completion returned an error status"
            );
            return Err(AppError::Upstream(format!("status {}", status)));
        }

        let body: MessagesResponse = response.json().await.map_err(transport_error)?;
        Ok(body.reply_text())
    }

    /// Open a streaming completion.
    ///
    /// Returns once the upstream has accepted the call, so connection and
    /// status failures surface as an `Err` before any output is produced.
    /// The stream then yields [`StreamEvent::Delta`] items in arrival order
    /// and finishes with [`StreamEvent::Done`] at the model's stop event;
    /// mid-stream transport failures arrive as an `Err` item.
    pub async fn stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<impl Stream<Item = Result<StreamEvent>> + Send + 'static> {
        let response = self
            .post_messages(request, true)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %truncate_detail(&body),
                "upstream stream open returned an error status"
            );
            return Err(AppError::Upstream(format!("status {}", status)));
        }

        let mut bytes = response.bytes_stream();

        Ok(async_stream::try_stream! {
            let mut parser = SseParser::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(transport_error)?;
                for event in parser.parse(&chunk) {
                    let Some(data) = event.data else { continue };
                    match serde_json::from_str::<WireEvent>(&data) {
                        Ok(WireEvent::ContentBlockDelta {
                            delta: WireDelta::TextDelta { text },
                        }) => yield StreamEvent::Delta(text),
                        Ok(WireEvent::MessageStop) => {
                            yield StreamEvent::Done;
                            return;
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::debug!(error = %err, "skipping unrecognized stream event");
                        }
                    }
                }
            }
        })
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    };
    AppError::Upstream(detail)
}

fn truncate_detail(message: &str) -> String {
    let mut chars = message.chars();
    let truncated: String = chars.by_ref().take(MAX_LOGGED_BODY).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

// ============================================================================
// SSE Parser
// ============================================================================

/// SSE event parsed from the upstream byte stream.
#[derive(Debug, Clone, Default)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: Option<String>,
}

/// Incremental SSE parser; feed it raw chunks, collect complete events.
pub struct SseParser {
    buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        SseParser {
            buffer: String::new(),
        }
    }

    /// Parse incoming bytes and return the events completed by them.
    pub fn parse(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let chunk_str = match std::str::from_utf8(chunk) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        self.buffer.push_str(chunk_str);

        let mut events = vec![];

        // Split by double newlines (event boundaries)
        while let Some(pos) = self.buffer.find("\n\n") {
            let event_block = self.buffer[..pos].to_string();
            self.buffer = self.buffer[pos + 2..].to_string();

            let mut current_event = SseEvent::default();
            for line in event_block.lines() {
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                if let Some((field, value)) = line.split_once(':') {
                    let value = value.strip_prefix(' ').unwrap_or(value);
                    match field {
                        "event" => current_event.event = Some(value.to_string()),
                        "data" => {
                            if let Some(ref mut data) = current_event.data {
                                data.push('\n');
                                data.push_str(value);
                            } else {
                                current_event.data = Some(value.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }

            if current_event.data.is_some() || current_event.event.is_some() {
                events.push(current_event);
            }
        }

        events
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}
