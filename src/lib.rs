use axum::Router;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod client;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

#[cfg(test)]
mod integration_test;

/// Data shared by every request handler. Holds no per-user state: sessions and todos
/// both live in the database.
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub session_cookie_name: String,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles the procedure routes (under "/rpc") and the API documentation into one router
pub fn build_router(shared_data: SharedData) -> Router {
    let router = Router::new()
        .nest("/rpc", api::todo::todo_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(Arc::new(shared_data));

    logging::attach_tracing_http(router)
}
