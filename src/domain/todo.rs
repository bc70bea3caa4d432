use crate::domain::Error;
use crate::domain::session::Identity;
use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::external_connections::ExternalConnectivity;
use chrono::{DateTime, Utc};
use derive_more::Display;
use std::str::FromStr;
use tracing::{debug, info};
use validator::Validate;

pub use validation::{validate_status, validate_title};

/// Longest title a todo may carry, in characters
pub const MAX_TITLE_LENGTH: usize = 256;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Display)]
pub enum TodoStatus {
    #[display("PENDING")]
    Pending,
    #[display("IN_PROGRESS")]
    InProgress,
    #[display("DONE")]
    Done,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// The representation used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a todo status")]
pub struct UnknownStatus(pub String);

impl FromStr for TodoStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TodoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_owned()))
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub owner_user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A todo waiting to be inserted. Build it with [NewTodo::new] so the title is trimmed
/// and a blank description collapses to "absent".
#[derive(PartialEq, Eq, Debug, Clone, Validate)]
pub struct NewTodo {
    #[validate(custom = "validate_title")]
    pub title: String,
    pub description: Option<String>,
}

impl NewTodo {
    pub fn new(title: &str, description: Option<&str>) -> NewTodo {
        NewTodo {
            title: title.trim().to_owned(),
            description: description
                .filter(|desc| !desc.trim().is_empty())
                .map(str::to_owned),
        }
    }
}

mod validation {
    use super::*;
    use std::borrow::Cow;
    use validator::ValidationError;

    /// Titles must have content once surrounding whitespace is gone and fit in [MAX_TITLE_LENGTH]
    pub fn validate_title(title: &str) -> Result<(), ValidationError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            let mut err = ValidationError::new("blank");
            err.message = Some(Cow::from("title must not be blank"));
            return Err(err);
        }

        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            let mut err = ValidationError::new("length");
            err.message = Some(Cow::from("title must be at most 256 characters"));
            err.add_param(Cow::from("max"), &MAX_TITLE_LENGTH);
            return Err(err);
        }

        Ok(())
    }

    pub fn validate_status(status: &str) -> Result<(), ValidationError> {
        TodoStatus::from_str(status).map(|_| ()).map_err(|unknown| {
            let mut err = ValidationError::new("status");
            err.message = Some(Cow::from(unknown.to_string()));
            err.add_param(Cow::from("allowed"), &["PENDING", "IN_PROGRESS", "DONE"]);
            err
        })
    }
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        /// All of [user_id]'s todos, newest first
        async fn todos_for_user(
            &self,
            user_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
    }

    /// Every write is keyed on both the todo id and the owner, and reports how many rows it touched
    pub trait TodoWriter {
        async fn create_todo_for_user(
            &self,
            user_id: &str,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        async fn update_status(
            &self,
            user_id: &str,
            todo_id: i32,
            status: TodoStatus,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        async fn delete_todo(
            &self,
            user_id: &str,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    /// The four todo procedures, each scoped to the authenticated caller
    pub trait TodoPort {
        async fn todos_for_user(
            &self,
            caller: &Identity,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl TodoReader,
        ) -> Result<Vec<Todo>, Error>;
        async fn create_todo(
            &self,
            caller: &Identity,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl TodoWriter,
        ) -> Result<Todo, Error>;
        async fn update_status(
            &self,
            caller: &Identity,
            todo_id: i32,
            status: TodoStatus,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl TodoWriter,
        ) -> Result<(), Error>;
        async fn delete_todo(
            &self,
            caller: &Identity,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl TodoWriter,
        ) -> Result<(), Error>;
    }
}

pub struct TodoService;

impl driving_ports::TodoPort for TodoService {
    async fn todos_for_user(
        &self,
        caller: &Identity,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, Error> {
        todo_read
            .todos_for_user(&caller.id, &mut *ext_cxn)
            .await
            .map_err(Error::storage_trying_to("list todos"))
    }

    async fn create_todo(
        &self,
        caller: &Identity,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, Error> {
        new_todo.validate()?;

        let created = todo_write
            .create_todo_for_user(&caller.id, new_todo, &mut *ext_cxn)
            .await
            .map_err(Error::storage_trying_to("create a todo"))?;
        info!(todo_id = created.id, "created todo");

        Ok(created)
    }

    async fn update_status(
        &self,
        caller: &Identity,
        todo_id: i32,
        status: TodoStatus,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), Error> {
        let touched = todo_write
            .update_status(&caller.id, todo_id, status, &mut *ext_cxn)
            .await
            .map_err(Error::storage_trying_to("update a todo's status"))?;
        if touched == 0 {
            debug!(todo_id, "status update matched no todo owned by the caller");
        }

        Ok(())
    }

    async fn delete_todo(
        &self,
        caller: &Identity,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), Error> {
        let touched = todo_write
            .delete_todo(&caller.id, todo_id, &mut *ext_cxn)
            .await
            .map_err(Error::storage_trying_to("delete a todo"))?;
        if touched == 0 {
            debug!(todo_id, "delete matched no todo owned by the caller");
        }

        Ok(())
    }
}
