use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,lambda_runtime=warn,hyper=warn";

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(false)
                .without_time(),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter()))
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_LOG_FILTER)
}
