use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(String),
    #[error("invalid json: {0}")]
    InvalidJson(String),
}

/// Encodes a JSON document the way the Contents API expects it: pretty
/// printed, then base64.
pub fn encode_content(value: &Value) -> String {
    let json = serde_json::to_string_pretty(value).expect("JSON value is always serializable");
    STANDARD.encode(json)
}

/// Decodes a base64 payload returned by the Contents API into JSON.
///
/// The API wraps its base64 output in newlines every 60 characters, which
/// strict decoders reject, so all whitespace is stripped first.
pub fn decode_content(content: &str) -> Result<Value, DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| DecodeError::InvalidJson(e.to_string()))
}
