use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use smartroom_functions_core::config::FunctionsConfig;
use smartroom_functions_lambda::dispatcher::FunctionHandlers;
use smartroom_functions_lambda::router::Router;
use smartroom_functions_lambda::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    let config = FunctionsConfig::from_env()?;
    tracing::info!(
        function = "migrateUserClaims",
        max_instances = config.max_instances,
        "function starting"
    );

    let router = Router::new(FunctionHandlers::with_tracing())?;
    let router = &router;
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<Value>| async move {
            router.serve_callable(event.payload).map_err(Error::from)
        },
    ))
    .await
}
