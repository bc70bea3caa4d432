use crate::domain;
use crate::domain::todo::{validate_status, validate_title};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Done,
}

impl From<domain::todo::TodoStatus> for TodoStatus {
    fn from(value: domain::todo::TodoStatus) -> Self {
        match value {
            domain::todo::TodoStatus::Pending => TodoStatus::Pending,
            domain::todo::TodoStatus::InProgress => TodoStatus::InProgress,
            domain::todo::TodoStatus::Done => TodoStatus::Done,
        }
    }
}

impl From<TodoStatus> for domain::todo::TodoStatus {
    fn from(value: TodoStatus) -> Self {
        match value {
            TodoStatus::Pending => domain::todo::TodoStatus::Pending,
            TodoStatus::InProgress => domain::todo::TodoStatus::InProgress,
            TodoStatus::Done => domain::todo::TodoStatus::Done,
        }
    }
}

/// DTO for a todo returned from a procedure. The owner is never echoed back.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Buy milk")]
    pub title: String,
    #[schema(example = "2% if they have it")]
    pub description: Option<String>,
    pub status: TodoStatus,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
        Todo {
            id: value.id,
            title: value.title,
            description: value.description,
            status: value.status.into(),
            created_at: value.created_at,
        }
    }
}

/// Input for the "create" procedure
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewTodo {
    #[validate(custom = "validate_title")]
    #[schema(example = "Buy milk", min_length = 1, max_length = 256)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<NewTodo> for domain::todo::NewTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTodo::new(&value.title, value.description.as_deref())
    }
}

/// Input for the "updateStatus" procedure. The status arrives as a plain string so an
/// unknown value is reported as invalid input rather than unreadable JSON.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTodoStatus {
    #[schema(example = 10)]
    pub id: i32,
    #[validate(custom = "validate_status")]
    #[schema(example = "IN_PROGRESS")]
    pub status: String,
}

impl TryFrom<&UpdateTodoStatus> for domain::todo::TodoStatus {
    type Error = ValidationErrors;

    fn try_from(value: &UpdateTodoStatus) -> Result<Self, Self::Error> {
        value.validate()?;

        domain::todo::TodoStatus::from_str(&value.status).map_err(|_| {
            let mut errs = ValidationErrors::new();
            errs.add("status", ValidationError::new("status"));
            errs
        })
    }
}

/// Input for the "delete" procedure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTodo {
    #[schema(example = 10)]
    pub id: i32,
}
