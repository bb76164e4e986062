// Packaged as `bootstrap` for the provided.al2023 runtime.
// Requires APP_PUBLIC_KEY (hex Ed25519 public key).

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    fnstack_lambda::run_discord_pong().await
}
