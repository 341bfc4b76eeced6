//! Crate error type. Browser-facing exports still return `Result<_, JsValue>`;
//! internal code propagates `NarrativeError` and converts at the boundary.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum NarrativeError {
    /// A required element id was not present in the document.
    #[error("missing page anchor `#{0}`")]
    MissingAnchor(String),
    #[error("dom operation failed: {0}")]
    Dom(String),
    #[error("invalid narrative config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("please upload an image before submitting")]
    MissingPhoto,
    #[error("archive client not initialized; check the backend configuration")]
    ArchiveUnavailable,
    #[error("archive submission failed: {0}")]
    Archive(String),
}

impl From<JsValue> for NarrativeError {
    fn from(value: JsValue) -> Self {
        NarrativeError::Dom(describe_js(&value))
    }
}

impl From<NarrativeError> for JsValue {
    fn from(err: NarrativeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value (Error objects carry `message`).
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Ok(msg) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(s) = msg.as_string() {
            return s;
        }
    }
    format!("{:?}", value)
}

pub type Result<T, E = NarrativeError> = std::result::Result<T, E>;
