use crate::HttpResponseData;
use serde_json::json;
use thiserror::Error;

/// Public key could not be loaded; fatal at startup
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("public key is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("public key must be 32 bytes, got {0}")]
    Length(usize),

    #[error("public key is not a valid Ed25519 point: {0}")]
    Invalid(#[source] ed25519_dalek::SignatureError),
}

/// Why a request signature was rejected; logged, never returned to callers
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("signature is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("malformed signature: {0}")]
    Malformed(#[source] ed25519_dalek::SignatureError),

    #[error("signature does not match: {0}")]
    Mismatch(#[source] ed25519_dalek::SignatureError),
}

/// Client-visible interaction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionError {
    EmptyBody,
    InvalidSignature,
    InvalidPayload,
    EmptyData,
}

impl InteractionError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyBody => 400,
            Self::InvalidSignature => 401,
            Self::InvalidPayload => 400,
            Self::EmptyData => 400,
        }
    }

    /// Error type string for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::EmptyBody => "EmptyBody",
            Self::InvalidSignature => "InvalidSignature",
            Self::InvalidPayload => "InvalidPayload",
            Self::EmptyData => "EmptyData",
        }
    }

    /// Message placed in the `errorMessage` field
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyBody => "invalid empty body",
            Self::InvalidSignature => "invalid signature",
            Self::InvalidPayload => "invalid interaction payload",
            Self::EmptyData => "Empty data",
        }
    }

    pub fn into_response(self) -> HttpResponseData {
        HttpResponseData::json_value(
            self.status_code(),
            &json!({ "errorMessage": self.message() }),
        )
    }
}
