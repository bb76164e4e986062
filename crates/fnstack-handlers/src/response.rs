// Runtime-independent HTTP response

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status_code: u16,
    pub body: String,
    pub content_type: &'static str,
}

impl HttpResponseData {
    pub fn json(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            body,
            content_type: "application/json",
        }
    }

    /// Serialize `value` as the JSON body
    pub fn json_value<T: Serialize>(status_code: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::json(status_code, body),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response body");
                Self::json(500, r#"{"errorMessage":"internal error"}"#.to_string())
            }
        }
    }
}
