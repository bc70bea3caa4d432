//! Client half of the procedure contract: an HTTP caller for the four procedures, the
//! cache holding the last-fetched list, and the form/row state a front end binds to.

use crate::dto;
use thiserror::Error;

pub mod cache;
pub mod http;
pub mod view;

pub use cache::{CacheEvent, Invalidator, ListKey, TodoListCache};
pub use http::HttpTodoClient;

/// How a procedure call failed, as seen from the caller's side
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcedureError {
    #[error("sign in to continue")]
    Unauthorized,
    #[error("{0}")]
    Invalid(String),
    #[error("the server could not complete the request")]
    Storage,
    #[error("could not reach the server: {0}")]
    Transport(String),
}

/// The four todo procedures, invoked on behalf of whichever session the implementation carries
pub trait TodoProcedures {
    async fn get_all(&self) -> Result<Vec<dto::Todo>, ProcedureError>;
    async fn create(&self, new_todo: &dto::NewTodo) -> Result<dto::Todo, ProcedureError>;
    async fn update_status(&self, id: i32, status: dto::TodoStatus) -> Result<(), ProcedureError>;
    async fn delete(&self, id: i32) -> Result<(), ProcedureError>;
}
