//! Lambda entry point for the CodePipeline → GitHub commit-status relay.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration** — read `AWS_REGION` and the `RELAY_*` variables
//!    once and validate them.
//! 2. **Wire observability** — configure `tracing-subscriber` with a JSON layer
//!    and, when enabled, an OpenTelemetry OTLP exporter. All `tracing` spans
//!    and structured events emitted by every crate in the workspace flow
//!    through this layer.
//! 3. **Construct infrastructure** — build the shared AWS SDK configuration,
//!    `CodePipelineExecutions`, `SsmParameterStore`, and
//!    `GithubStatusPublisher`, and inject them into one `StatusRelay`.
//! 4. **Serve** — hand the relay to the `listener` event loop.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use aws_services::{CodePipelineExecutions, SsmParameterStore};
use github::GithubStatusPublisher;
use listener::{HookFuture, InvocationHook};
use relay::StatusRelay;
use tracing::info;

use crate::config::ServiceConfig;
use crate::telemetry::{flush_telemetry, init_telemetry, shutdown_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("failed to load configuration")?;
    config.validate()?;

    let tracer_provider = init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    })
    .context("failed to initialize telemetry")?;

    info!(
        region = %config.aws_region,
        token_parameter = %config.github_token_parameter,
        github_api_url = %config.github_api_url,
        otel_enabled = config.otel_enabled,
        "Starting CodePipeline GitHub status relay"
    );

    let sdk_config = aws_services::load_sdk_config().await;
    let relay = Arc::new(StatusRelay::new(
        config.relay_settings(),
        Arc::new(CodePipelineExecutions::new(&sdk_config)),
        Arc::new(SsmParameterStore::new(&sdk_config)),
        Arc::new(GithubStatusPublisher::new(config.github_config())?),
    ));

    let flush_provider = tracer_provider.clone();
    let after_invocation: InvocationHook = Arc::new(move || -> HookFuture {
        let provider = flush_provider.clone();
        Box::pin(flush_telemetry(provider))
    });

    let result = listener::run(relay, after_invocation).await;
    shutdown_telemetry(tracer_provider).await;
    result.map_err(|e| anyhow::anyhow!(e))
}
