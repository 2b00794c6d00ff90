//! API request and response models.
//!
//! Request bodies deserialize leniently: missing fields fall back to empty
//! values so validation happens in the handlers, where it can produce a
//! meaningful error message instead of a serde rejection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::ChatMessage;

/// Chat request carrying the full conversation history.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Contact-form inquiry submitted for classification.
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub description: String,
}

/// Document text submitted to the classification demo.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub text: String,
}

/// Email body submitted to the triage demo.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailTriageRequest {
    #[serde(default)]
    pub email: String,
}

/// Invoice text submitted for field extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceRequest {
    #[serde(default)]
    pub text: String,
}

/// Natural-language question for the simulated enterprise-systems demo.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemsQueryRequest {
    #[serde(default)]
    pub query: String,
}

/// Classification result for a contact-form inquiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub classification: Value,
}

/// Structured analysis produced by one of the demo endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub result: Value,
}

/// Plain text recovered from an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub text: String,
}

/// Answer plus the simulated tool-call trace from the systems demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemsDemoResponse {
    pub answer: String,

    #[serde(rename = "mcpCalls")]
    pub mcp_calls: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_defaults_to_empty_history() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.messages.is_empty());
    }

    #[test]
    fn test_chat_request_parses_messages() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi, how can I help?"}
            ]
        }))
        .unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, "Hello");
    }

    #[test]
    fn test_inquiry_request_missing_fields_are_empty() {
        let request: InquiryRequest =
            serde_json::from_value(json!({"name": "Ada"})).unwrap();
        assert_eq!(request.name, "Ada");
        assert_eq!(request.email, "");
        assert_eq!(request.company, "");
        assert_eq!(request.description, "");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let request: DocumentRequest =
            serde_json::from_value(json!({"text": "a memo", "extra": 42})).unwrap();
        assert_eq!(request.text, "a memo");
    }

    #[test]
    fn test_systems_demo_response_uses_camel_case_key() {
        let response = SystemsDemoResponse {
            answer: "Sarah Chen has 12 PTO days left.".to_string(),
            mcp_calls: json!({"tools": ["get_employee"], "system": "Workday"}),
        };
        let encoded = serde_json::to_string(&response).unwrap();
        assert!(encoded.contains("\"mcpCalls\""));
        assert!(!encoded.contains("mcp_calls"));
    }

    #[test]
    fn test_classification_response_round_trips_arbitrary_shape() {
        let response = ClassificationResponse {
            classification: json!({"service": "MCP Integrations", "fitScore": 9}),
        };
        let encoded = serde_json::to_string(&response).unwrap();
        let decoded: ClassificationResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.classification["fitScore"], 9);
    }
}
