use crate::response::{HttpLambdaResponse, HttpRequestEvent};
use base64::Engine;
use fnstack_handlers::{
    fixed_success, handle_interaction, HttpResponseData, InteractionRequest, SignatureVerifier,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::{debug, info_span, Instrument};

/// Verify and answer one interaction event
pub async fn handle_discord_pong(
    event: LambdaEvent<HttpRequestEvent>,
    verifier: &SignatureVerifier,
) -> Result<HttpLambdaResponse, Error> {
    let (request, context) = event.into_parts();
    let span = info_span!("invocation", request_id = %context.request_id);

    async move {
        let parts = request.parts();
        let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());

        let data = match decode_body(parts.body, parts.is_base64_encoded) {
            Ok(body) => handle_interaction(
                verifier,
                InteractionRequest {
                    body: body.as_deref(),
                    signature: header(SIGNATURE_HEADER),
                    timestamp: header(TIMESTAMP_HEADER),
                },
            ),
            Err(response) => response,
        };
        debug!(status = data.status_code, "interaction handled");

        Ok(request.respond(data))
    }
    .instrument(span)
    .await
}

/// Either an HTTP-shaped response or the bare status object
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Return200Response {
    Http(HttpLambdaResponse),
    Raw(Value),
}

/// Answer any event with `{"status":"200"}`
///
/// HTTP events get the body wrapped in their response type; anything else
/// (direct invokes, queue events) gets the bare object.
pub async fn handle_return_200(event: LambdaEvent<Value>) -> Result<Return200Response, Error> {
    let (payload, context) = event.into_parts();
    let _guard = info_span!("invocation", request_id = %context.request_id).entered();

    let data = fixed_success();
    let is_http = payload.get("requestContext").is_some();
    let response = match is_http
        .then(|| serde_json::from_value::<HttpRequestEvent>(payload).ok())
        .flatten()
    {
        Some(request) => Return200Response::Http(request.respond(data)),
        None => Return200Response::Raw(serde_json::from_str(&data.body)?),
    };
    debug!("acknowledged event");
    Ok(response)
}

/// Missing bodies come back as `None` so the responder can reject them
fn decode_body(
    body: Option<&str>,
    is_base64_encoded: bool,
) -> Result<Option<Cow<'_, [u8]>>, HttpResponseData> {
    let Some(body) = body else {
        return Ok(None);
    };

    if is_base64_encoded {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(body.as_bytes())
            .map_err(|_| {
                HttpResponseData::json_value(400, &json!({ "errorMessage": "invalid base64 body" }))
            })?;
        Ok(Some(Cow::Owned(decoded)))
    } else {
        Ok(Some(Cow::Borrowed(body.as_bytes())))
    }
}
