// Chat-bot interaction responder
//
// Checks run in a fixed order: body present, signature valid, payload
// parses, command types carry data. Only then is the interaction answered:
// pings get a pong, everything else an "unknown command" message.

use crate::error::InteractionError;
use crate::verify::SignatureVerifier;
use crate::HttpResponseData;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Interaction kinds as numbered by the chat platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
    Other(u64),
}

impl From<u64> for InteractionType {
    fn from(value: u64) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::ApplicationCommandAutocomplete,
            5 => Self::ModalSubmit,
            other => Self::Other(other),
        }
    }
}

impl InteractionType {
    pub fn code(&self) -> u64 {
        match self {
            Self::Ping => 1,
            Self::ApplicationCommand => 2,
            Self::MessageComponent => 3,
            Self::ApplicationCommandAutocomplete => 4,
            Self::ModalSubmit => 5,
            Self::Other(code) => *code,
        }
    }

    fn requires_data(&self) -> bool {
        matches!(
            self,
            Self::ApplicationCommand | Self::ApplicationCommandAutocomplete
        )
    }
}

/// Response type codes
pub const RESPONSE_PONG: u64 = 1;
pub const RESPONSE_CHANNEL_MESSAGE: u64 = 4;

#[derive(Debug, Deserialize)]
struct InteractionPayload {
    #[serde(rename = "type")]
    kind: u64,
    #[serde(default)]
    data: Option<Value>,
}

/// Decoded request pieces the responder needs
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionRequest<'a> {
    pub body: Option<&'a [u8]>,
    pub signature: Option<&'a str>,
    pub timestamp: Option<&'a str>,
}

pub fn handle_interaction(
    verifier: &SignatureVerifier,
    request: InteractionRequest<'_>,
) -> HttpResponseData {
    match respond(verifier, request) {
        Ok(response) => response,
        Err(e) => {
            info!(
                error_type = e.error_type(),
                status = e.status_code(),
                "interaction rejected"
            );
            e.into_response()
        }
    }
}

fn respond(
    verifier: &SignatureVerifier,
    request: InteractionRequest<'_>,
) -> Result<HttpResponseData, InteractionError> {
    let body = request
        .body
        .filter(|b| !b.is_empty())
        .ok_or(InteractionError::EmptyBody)?;

    let (signature, timestamp) = match (request.signature, request.timestamp) {
        (Some(signature), Some(timestamp)) if !signature.is_empty() && !timestamp.is_empty() => {
            (signature, timestamp)
        }
        _ => return Err(InteractionError::InvalidSignature),
    };
    if !verifier.verify(timestamp, body, signature) {
        return Err(InteractionError::InvalidSignature);
    }
    debug!("valid signature");

    let payload: InteractionPayload =
        serde_json::from_slice(body).map_err(|_| InteractionError::InvalidPayload)?;
    let kind = InteractionType::from(payload.kind);

    if kind.requires_data() && payload.data.as_ref().map_or(true, Value::is_null) {
        return Err(InteractionError::EmptyData);
    }

    if kind == InteractionType::Ping {
        return Ok(HttpResponseData::json_value(
            200,
            &json!({ "type": RESPONSE_PONG }),
        ));
    }

    Ok(HttpResponseData::json_value(
        400,
        &ChannelMessage {
            kind: RESPONSE_CHANNEL_MESSAGE,
            content: format!("Unknown command {}", kind.code()),
        },
    ))
}

/// Message reply; `type` is written before `content`
#[derive(Debug, Serialize)]
struct ChannelMessage {
    #[serde(rename = "type")]
    kind: u64,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_type_codes_round_trip() {
        for code in 1..=6 {
            assert_eq!(InteractionType::from(code).code(), code);
        }
        assert_eq!(InteractionType::from(1), InteractionType::Ping);
        assert_eq!(InteractionType::from(9), InteractionType::Other(9));
    }

    #[test]
    fn only_commands_require_data() {
        assert!(InteractionType::ApplicationCommand.requires_data());
        assert!(InteractionType::ApplicationCommandAutocomplete.requires_data());
        assert!(!InteractionType::Ping.requires_data());
        assert!(!InteractionType::MessageComponent.requires_data());
    }
}
