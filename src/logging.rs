use crate::app_env;
use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_http::HeaderExtractor;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::{Resource, runtime};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, info_span, warn};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// The name of the service as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "todo-rpc";
/// Path prefix every procedure is served under
const PROCEDURE_PREFIX: &str = "/rpc/";

pub struct OtelExporters {
    pub tracer: Tracer,
    pub meter: SdkMeterProvider,
}

/// Name of the procedure a request path targets, such as "todo.getAll" for "/rpc/todo.getAll".
/// Paths outside the procedure namespace (docs, unknown routes) have none.
pub fn procedure_name(path: &str) -> Option<&str> {
    path.strip_prefix(PROCEDURE_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

/// Wraps every request in a "procedure" span named after the procedure called, parented to any
/// W3C trace context the caller sent. Server-side failures are logged at warn, everything else
/// at debug.
pub fn attach_tracing_http<T>(router: Router<T>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                let path = request.uri().path();
                let span = info_span!(
                    "procedure",
                    procedure = procedure_name(path).unwrap_or("-"),
                    method = %request.method(),
                    path,
                    response_status = tracing::field::Empty,
                );

                span.set_parent(global::get_text_map_propagator(|propagator| {
                    propagator.extract(&HeaderExtractor(request.headers()))
                }));

                span
            })
            .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
                let status = response.status();
                span.record("response_status", status.as_u16());
                let latency_ms = latency.as_millis() as u64;

                if status.is_server_error() {
                    warn!(latency_ms, "procedure failed");
                } else {
                    debug!(latency_ms, "procedure complete");
                }
            }),
    )
}

fn service_resource() -> Resource {
    Resource::new([KeyValue::new("service.name", SERVICE_NAME)])
}

/// Starts background OTLP exporters for spans and metrics, sending over gRPC to the given
/// endpoints (usually a collector sidecar on http://localhost:4317)
pub fn init_exporters(
    otlp_traces_endpoint: &str,
    otlp_metrics_endpoint: &str,
) -> Result<OtelExporters, anyhow::Error> {
    let span_export = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_traces_endpoint)
        .build()
        .context("building the span exporter")?;
    let meter_export = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_metrics_endpoint)
        .build()
        .context("building the metric exporter")?;

    let tracer = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(span_export, runtime::Tokio)
        .with_resource(service_resource())
        .build()
        .tracer(SERVICE_NAME);
    let meter = SdkMeterProvider::builder()
        .with_reader(PeriodicReader::builder(meter_export, runtime::Tokio).build())
        .with_resource(service_resource())
        .build();

    Ok(OtelExporters { tracer, meter })
}

/// Stdout filter configured through [app_env::LOG_LEVEL], "info" when unset
pub fn init_env_filter() -> Result<EnvFilter, anyhow::Error> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(app_env::LOG_LEVEL)
        .from_env()
        .context("building the logging filter")
}

/// Installs the global subscriber: JSON lines on stdout filtered by [env_filter], plus span and
/// metric export at debug level and above when [otel_exporters] is provided.
pub fn setup_logging_and_tracing(env_filter: EnvFilter, otel_exporters: Option<OtelExporters>) {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let (span_layer, metrics_layer) = match otel_exporters {
        Some(exporters) => (
            Some(OpenTelemetryLayer::new(exporters.tracer)),
            Some(MetricsLayer::new(exporters.meter)),
        ),
        None => (None, None),
    };

    registry()
        .with(LevelFilter::DEBUG)
        .with(span_layer)
        .with(metrics_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_filter(env_filter),
        )
        .init();
}
