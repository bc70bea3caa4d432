use crate::api::session::RequestCredentials;
use crate::domain::session::driven_ports::SessionVerifier;
use crate::domain::session::{authenticate, SessionCredentials};
use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoPort;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_session_driven_ports::DbSessionVerifier;
use crate::persistence::db_todo_driven_ports::{DbTodoReader, DbTodoWriter};
use crate::routing_utils::{
    BasicErrorResponse, DomainErrorResponse, Json, JsonErrorResponse, ValidationErrorResponse,
};
use crate::{domain, dto, AppState, SharedData};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(paths(get_all, create, update_status, delete))]
/// Defines the OpenAPI documentation for the todo procedures
pub struct TodoApi;
/// Constant used to group todo procedures in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todo";

/// Procedure body as extracted from the request. A malformed body is only reported
/// once the caller has been authenticated.
type ProcedureInput<T> = Result<Json<T>, JsonErrorResponse>;

/// Creates a router for the four todo procedures, each named "todo.<procedure>"
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/todo.getAll",
            get(
                |State(app_state): AppState, RequestCredentials(credentials): RequestCredentials| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();

                    get_all(&credentials, &mut ext_cxn, &DbSessionVerifier, &domain::todo::TodoService, &DbTodoReader).await
                },
            ),
        )
        .route(
            "/todo.create",
            post(
                |State(app_state): AppState,
                 RequestCredentials(credentials): RequestCredentials,
                 input: ProcedureInput<dto::NewTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let input = input.map(|Json(new_todo)| new_todo);

                    create(&credentials, input, &mut ext_cxn, &DbSessionVerifier, &domain::todo::TodoService, &DbTodoWriter).await
                },
            ),
        )
        .route(
            "/todo.updateStatus",
            post(
                |State(app_state): AppState,
                 RequestCredentials(credentials): RequestCredentials,
                 input: ProcedureInput<dto::UpdateTodoStatus>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let input = input.map(|Json(update)| update);

                    update_status(&credentials, input, &mut ext_cxn, &DbSessionVerifier, &domain::todo::TodoService, &DbTodoWriter).await
                },
            ),
        )
        .route(
            "/todo.delete",
            post(
                |State(app_state): AppState,
                 RequestCredentials(credentials): RequestCredentials,
                 input: ProcedureInput<dto::DeleteTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let input = input.map(|Json(target)| target);

                    delete(&credentials, input, &mut ext_cxn, &DbSessionVerifier, &domain::todo::TodoService, &DbTodoWriter).await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/rpc/todo.getAll",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "The caller's todos, newest first", body = [dto::Todo]),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(name = "todo.getAll", skip_all)]
/// Lists every todo owned by the caller
async fn get_all(
    credentials: &SessionCredentials,
    ext_cxn: &mut impl ExternalConnectivity,
    verifier: &impl SessionVerifier,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
) -> Result<Json<Vec<dto::Todo>>, ErrorResponse> {
    let caller = authenticate(credentials, &mut *ext_cxn, verifier)
        .await
        .map_err(DomainErrorResponse::from)?;
    info!(user_id = %caller.id, "listing todos");

    let todos = todo_service
        .todos_for_user(&caller, &mut *ext_cxn, todo_read)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(Json(todos.into_iter().map(dto::Todo::from).collect()))
}

#[utoipa::path(
    post,
    path = "/rpc/todo.create",
    tag = TODO_API_GROUP,
    request_body = dto::NewTodo,
    responses(
        (status = 201, description = "Todo created", body = dto::Todo),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(name = "todo.create", skip_all)]
/// Creates a pending todo owned by the caller
async fn create(
    credentials: &SessionCredentials,
    input: Result<dto::NewTodo, JsonErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    verifier: &impl SessionVerifier,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
) -> Result<(StatusCode, Json<dto::Todo>), ErrorResponse> {
    let caller = authenticate(credentials, &mut *ext_cxn, verifier)
        .await
        .map_err(DomainErrorResponse::from)?;
    let new_todo = input?;
    info!(user_id = %caller.id, "creating todo");
    new_todo.validate().map_err(ValidationErrorResponse::from)?;

    let domain_todo = domain::todo::NewTodo::from(new_todo);
    let created = todo_service
        .create_todo(&caller, &domain_todo, &mut *ext_cxn, todo_write)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok((StatusCode::CREATED, Json(dto::Todo::from(created))))
}

#[utoipa::path(
    post,
    path = "/rpc/todo.updateStatus",
    tag = TODO_API_GROUP,
    request_body = dto::UpdateTodoStatus,
    responses(
        (status = 204, description = "Acknowledged. Todos the caller doesn't own are left untouched"),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(name = "todo.updateStatus", skip_all)]
/// Moves one of the caller's todos to a new status
async fn update_status(
    credentials: &SessionCredentials,
    input: Result<dto::UpdateTodoStatus, JsonErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    verifier: &impl SessionVerifier,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
) -> Result<StatusCode, ErrorResponse> {
    let caller = authenticate(credentials, &mut *ext_cxn, verifier)
        .await
        .map_err(DomainErrorResponse::from)?;
    let update = input?;
    info!(user_id = %caller.id, todo_id = update.id, "updating todo status");
    let status =
        domain::todo::TodoStatus::try_from(&update).map_err(ValidationErrorResponse::from)?;

    todo_service
        .update_status(&caller, update.id, status, &mut *ext_cxn, todo_write)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/rpc/todo.delete",
    tag = TODO_API_GROUP,
    request_body = dto::DeleteTodo,
    responses(
        (status = 204, description = "Acknowledged. Todos the caller doesn't own are left untouched"),
        (status = 400, response = BasicErrorResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
#[tracing::instrument(name = "todo.delete", skip_all)]
/// Permanently removes one of the caller's todos
async fn delete(
    credentials: &SessionCredentials,
    input: Result<dto::DeleteTodo, JsonErrorResponse>,
    ext_cxn: &mut impl ExternalConnectivity,
    verifier: &impl SessionVerifier,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
) -> Result<StatusCode, ErrorResponse> {
    let caller = authenticate(credentials, &mut *ext_cxn, verifier)
        .await
        .map_err(DomainErrorResponse::from)?;
    let target = input?;
    info!(user_id = %caller.id, todo_id = target.id, "deleting todo");

    todo_service
        .delete_todo(&caller, target.id, &mut *ext_cxn, todo_write)
        .await
        .map_err(DomainErrorResponse::from)?;

    Ok(StatusCode::NO_CONTENT)
}
