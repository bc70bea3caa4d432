use crate::client::{ProcedureError, TodoProcedures};
use crate::dto;
use anyhow::Context;
use reqwest::{Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

/// Calls the todo procedures over HTTP, presenting one session token as a bearer credential.
/// Outgoing requests carry the current trace context.
pub struct HttpTodoClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    session_token: String,
}

/// Error body returned by the server
#[derive(Deserialize)]
struct ErrorEnvelope {
    error_description: String,
    extra_info: Option<Value>,
}

impl HttpTodoClient {
    pub fn new(
        base_url: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Result<HttpTodoClient, anyhow::Error> {
        let base_client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .context("building the HTTP client")?;
        let http_client = ClientBuilder::new(base_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(HttpTodoClient {
            http_client,
            base_url: base_url.into(),
            session_token: session_token.into(),
        })
    }

    fn procedure_url(&self, procedure: &str) -> String {
        format!("{}/rpc/todo.{procedure}", self.base_url.trim_end_matches('/'))
    }

    async fn call(&self, procedure: &str, input: Option<Value>) -> Result<Response, ProcedureError> {
        let url = self.procedure_url(procedure);
        let request = match input {
            Some(body) => self.http_client.post(url).json(&body),
            None => self.http_client.get(url),
        };

        let response = request
            .bearer_auth(&self.session_token)
            .send()
            .await
            .map_err(|err| ProcedureError::Transport(err.to_string()))?;

        check_status(response).await
    }
}

/// Turns non-success responses into the matching [ProcedureError]
async fn check_status(response: Response) -> Result<Response, ProcedureError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(ProcedureError::Unauthorized),
        StatusCode::BAD_REQUEST => {
            let envelope: ErrorEnvelope = response
                .json()
                .await
                .map_err(|err| ProcedureError::Transport(err.to_string()))?;
            Err(ProcedureError::Invalid(describe_rejection(&envelope)))
        }
        status => {
            warn!(%status, "procedure call failed on the server");
            Err(ProcedureError::Storage)
        }
    }
}

/// Builds a single human-readable line out of a 400 response, preferring the messages
/// attached to individual field validations
fn describe_rejection(envelope: &ErrorEnvelope) -> String {
    let field_messages: Vec<String> = envelope
        .extra_info
        .as_ref()
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .flat_map(|(field, issues)| {
                    issues
                        .as_array()
                        .into_iter()
                        .flatten()
                        .map(move |issue| match issue["message"].as_str() {
                            Some(message) => format!("{field}: {message}"),
                            None => format!("{field}: invalid"),
                        })
                })
                .collect()
        })
        .unwrap_or_default();

    if field_messages.is_empty() {
        envelope.error_description.clone()
    } else {
        field_messages.join("; ")
    }
}

fn unreadable(err: reqwest::Error) -> ProcedureError {
    ProcedureError::Transport(format!("unreadable response: {err}"))
}

impl TodoProcedures for HttpTodoClient {
    async fn get_all(&self) -> Result<Vec<dto::Todo>, ProcedureError> {
        self.call("getAll", None)
            .await?
            .json()
            .await
            .map_err(unreadable)
    }

    async fn create(&self, new_todo: &dto::NewTodo) -> Result<dto::Todo, ProcedureError> {
        let input = serde_json::to_value(new_todo)
            .map_err(|err| ProcedureError::Invalid(err.to_string()))?;

        self.call("create", Some(input))
            .await?
            .json()
            .await
            .map_err(unreadable)
    }

    async fn update_status(&self, id: i32, status: dto::TodoStatus) -> Result<(), ProcedureError> {
        self.call("updateStatus", Some(json!({ "id": id, "status": status })))
            .await?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), ProcedureError> {
        self.call("delete", Some(json!({ "id": id }))).await?;

        Ok(())
    }
}
