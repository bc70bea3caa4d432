use anyhow::Context;
use dotenv::dotenv;
use std::env;
use todo_rpc::{app_env, build_router, db, logging, persistence, SharedData};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv_result = dotenv();

    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(span_url), Ok(metric_url)) => Some(logging::init_exporters(&span_url, &metric_url)?),
        _ => None,
    };
    let otel_enabled = otel_exporters.is_some();
    logging::setup_logging_and_tracing(logging::init_env_filter()?, otel_exporters);
    if dotenv_result.is_err() {
        warn!("No .env file was loaded, relying on the process environment.");
    }
    if !otel_enabled {
        info!("OpenTelemetry export URLs not set, logging to stdout only.");
    }

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("{} must be set", app_env::DB_URL))?;
    let max_connections = env::var(app_env::DB_MAX_CONNECTIONS)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(app_env::DEFAULT_DB_MAX_CONNECTIONS);
    let pool = db::connect_sqlx(&db_url, max_connections)?;
    db::migrate(&pool).await?;

    let router = build_router(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
        session_cookie_name: env::var(app_env::SESSION_COOKIE_NAME)
            .unwrap_or_else(|_| app_env::DEFAULT_SESSION_COOKIE_NAME.to_owned()),
    });

    let listen_address = env::var(app_env::LISTEN_ADDRESS)
        .unwrap_or_else(|_| app_env::DEFAULT_LISTEN_ADDRESS.to_owned());
    let listener = tokio::net::TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("binding to {listen_address}"))?;

    info!(address = %listen_address, "Starting server.");
    axum::serve(listener, router).await?;

    Ok(())
}
