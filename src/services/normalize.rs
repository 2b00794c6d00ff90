//! Tolerant JSON extraction from free-form model replies.
//!
//! Classification prompts ask the model to answer with a single JSON object,
//! but replies routinely arrive wrapped in prose or code fences. The
//! normalizer locates the JSON island and parses it; it never validates the
//! parsed shape against the requested schema.

use crate::core::error::{AppError, Result};
use serde_json::Value;

/// Extract and parse the JSON object embedded in `raw`.
///
/// The object is taken to span the first `{` through the last `}` of the
/// text (greedy); everything outside that island is discarded. Fails with
/// [`AppError::Parse`] when no such span exists or the span is not valid
/// JSON. Malformed model output is the expected cause, not a defect here.
pub fn extract_json_object(raw: &str) -> Result<Value> {
    let start = raw
        .find('{')
        .ok_or_else(|| AppError::Parse("no opening brace".to_string()))?;
    let end = raw
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| AppError::Parse("no closing brace".to_string()))?;

    serde_json::from_str(&raw[start..=end]).map_err(|err| AppError::Parse(err.to_string()))
}
