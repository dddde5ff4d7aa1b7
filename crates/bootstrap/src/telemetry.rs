use anyhow::Result;
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for telemetry initialization
pub struct TelemetryConfig {
    pub service_name: String,
    pub otel_endpoint: String,
    pub otel_enabled: bool,
    pub log_level: String,
}

/// Initialize structured logging, optionally with OTLP span export.
///
/// When OTEL is enabled:
/// - Sets up an OTLP (gRPC) exporter for traces
/// - Bridges tracing spans to OpenTelemetry
///
/// When OTEL is disabled:
/// - Falls back to JSON logging only
pub fn init_telemetry(config: &TelemetryConfig) -> Result<Option<TracerProvider>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_span_list(true)
        .with_current_span(true);

    if !config.otel_enabled {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
        return Ok(None);
    }

    let tracer_provider = otlp_tracer_provider(config)?;
    let tracer = tracer_provider.tracer("codepipeline-github-status");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(Some(tracer_provider))
}

fn otlp_tracer_provider(config: &TelemetryConfig) -> Result<TracerProvider> {
    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        config.service_name.clone(),
    )]);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otel_endpoint)
        .build()?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(resource)
        .build())
}

/// Push buffered spans out before Lambda freezes the environment.
///
/// `force_flush` blocks until the exporter task, which lives on the tokio
/// runtime, acknowledges. It runs on the blocking pool so the runtime
/// workers stay free to drive that task.
pub async fn flush_telemetry(provider: Option<TracerProvider>) {
    let Some(provider) = provider else {
        return;
    };
    match tokio::task::spawn_blocking(move || provider.force_flush()).await {
        Ok(results) => {
            for result in results {
                if let Err(e) = result {
                    eprintln!("Error flushing tracer provider: {:?}", e);
                }
            }
        }
        Err(e) => eprintln!("Tracer flush task failed: {:?}", e),
    }
}

/// Shutdown telemetry and flush any pending traces
pub async fn shutdown_telemetry(provider: Option<TracerProvider>) {
    let Some(provider) = provider else {
        return;
    };
    match tokio::task::spawn_blocking(move || provider.shutdown()).await {
        Ok(Err(e)) => eprintln!("Error shutting down tracer provider: {:?}", e),
        Err(e) => eprintln!("Tracer shutdown task failed: {:?}", e),
        Ok(Ok(())) => {}
    }
}
