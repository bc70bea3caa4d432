use crate::routing_utils::BasicErrorResponse;
use utoipa::OpenApi;

pub mod todo;

pub use todo::{DeleteTodo, NewTodo, Todo, TodoStatus, UpdateTodoStatus};

#[derive(OpenApi)]
#[openapi(components(
    schemas(Todo, TodoStatus, NewTodo, UpdateTodoStatus, DeleteTodo),
    responses(BasicErrorResponse)
))]
/// Captures OpenAPI schemas and canned responses for the DTOs shared by the procedures
pub struct OpenApiSchemas;
