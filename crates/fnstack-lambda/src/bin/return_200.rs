// Packaged as `bootstrap` for the provided.al2023 runtime.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    fnstack_lambda::run_return_200().await
}
