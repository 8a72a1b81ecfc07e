//! Backend response envelope.
//!
//! Every endpoint wraps its payload as `{ success, data?, error? }` and
//! signals failure through both the HTTP status and `success: false`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(EnvelopeError {
                message: message.into(),
                code: code.map(str::to_string),
            }),
        }
    }
}
