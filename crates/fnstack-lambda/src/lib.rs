// AWS Lambda runtime adapter
//
// Two entry points share this crate: `discord-pong` answers signed chat
// interactions and `return-200` acknowledges every event. Both use the
// tokio runtime that lambda_runtime provides.

use fnstack_handlers::SignatureVerifier;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

mod handlers;
mod response;

pub use handlers::{handle_discord_pong, handle_return_200, Return200Response};
pub use response::{HttpLambdaResponse, HttpRequestEvent};

/// JSON logs for CloudWatch, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_ansi(false).with_current_span(true))
        .init();
}

fn log_startup(function: &str) {
    info!(
        function,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built_at = env!("BUILD_TIMESTAMP"),
        "lambda runtime starting"
    );
}

/// Entry point for the interaction responder
///
/// Fails before serving any event when `APP_PUBLIC_KEY` is missing or
/// malformed.
pub async fn run_discord_pong() -> Result<(), Error> {
    init_tracing();
    log_startup("discord-pong");

    let verifier = Arc::new(
        SignatureVerifier::from_env()
            .map_err(|e| Error::from(format!("Failed to load public key: {}", e)))?,
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<HttpRequestEvent>| {
        let verifier = verifier.clone();
        async move { handle_discord_pong(event, &verifier).await }
    }))
    .await
}

/// Entry point for the always-200 function
pub async fn run_return_200() -> Result<(), Error> {
    init_tracing();
    log_startup("return-200");

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| async move {
        handle_return_200(event).await
    }))
    .await
}
