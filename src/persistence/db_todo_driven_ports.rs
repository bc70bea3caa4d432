use crate::domain::todo::{NewTodo, Todo, TodoStatus};
use crate::domain;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, FromRow};
use std::str::FromStr;

#[derive(FromRow)]
struct TodoRow {
    id: i32,
    title: String,
    description: Option<String>,
    status: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = anyhow::Error;

    fn try_from(value: TodoRow) -> Result<Self, Self::Error> {
        let status = TodoStatus::from_str(&value.status)
            .with_context(|| format!("reading the status of todo {}", value.id))?;

        Ok(Todo {
            id: value.id,
            title: value.title,
            description: value.description,
            status,
            owner_user_id: value.user_id,
            created_at: value.created_at,
        })
    }
}

pub struct DbTodoReader;

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn todos_for_user(
        &self,
        user_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Todo>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        query_as::<_, TodoRow>(
            "SELECT id, title, description, status, user_id, created_at FROM todo
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
            .bind(user_id)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch todos for a user")?
            .into_iter()
            .map(Todo::try_from)
            .collect()
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create_todo_for_user(
        &self,
        user_id: &str,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let inserted = query_as::<_, TodoRow>(
            "INSERT INTO todo(title, description, user_id) VALUES ($1, $2, $3)
             RETURNING id, title, description, status, user_id, created_at",
        )
            .bind(&new_todo.title)
            .bind(new_todo.description.as_deref())
            .bind(user_id)
            .fetch_one(cxn.borrow_connection())
            .await
            .context("trying to insert a new todo into the database")?;

        Todo::try_from(inserted)
    }

    async fn update_status(
        &self,
        user_id: &str,
        todo_id: i32,
        status: TodoStatus,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("UPDATE todo SET status = $1 WHERE id = $2 AND user_id = $3")
            .bind(status.as_str())
            .bind(todo_id)
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to update a todo's status in the database")?;

        Ok(result.rows_affected())
    }

    async fn delete_todo(
        &self,
        user_id: &str,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("DELETE FROM todo WHERE id = $1 AND user_id = $2")
            .bind(todo_id)
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo from the database")?;

        Ok(result.rows_affected())
    }
}
