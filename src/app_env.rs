/// URL for accessing the PostgreSQL database which holds todo rows and the auth provider's session tables
pub const DB_URL: &str = "DATABASE_URL";
/// Maximum number of pooled database connections. Defaults to [DEFAULT_DB_MAX_CONNECTIONS]
pub const DB_MAX_CONNECTIONS: &str = "DB_MAX_CONNECTIONS";
/// Socket address the HTTP server binds to. Defaults to [DEFAULT_LISTEN_ADDRESS]
pub const LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
/// Name of the cookie carrying the session token issued by the auth provider. Defaults to
/// [DEFAULT_SESSION_COOKIE_NAME]
pub const SESSION_COOKIE_NAME: &str = "SESSION_COOKIE_NAME";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's EnvFilter](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "todo_session";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
