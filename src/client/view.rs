use crate::client::{Invalidator, ListKey, ProcedureError, TodoProcedures};
use crate::dto;
use tracing::{debug, info};

/// Shown in place of the list when the caller has no todos
pub const EMPTY_LIST_MESSAGE: &str = "No todos yet. Add one above!";
pub const SIGN_IN_FAILED_MESSAGE: &str = "Failed to sign in";

/// Pages a front end can be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    SignIn,
    Todos,
}

/// The session as the front end sees it, resolved by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub user_id: String,
    pub user_name: String,
    pub token: String,
}

impl ClientSession {
    pub fn list_key(&self) -> ListKey {
        ListKey::for_owner(&self.user_id)
    }

    pub fn greeting(&self) -> String {
        format!("Welcome, {}", self.user_name)
    }
}

/// Where the root path leads: signed-in users go straight to their todos
pub fn landing_route(session: Option<&ClientSession>) -> Route {
    match session {
        Some(_) => Route::Todos,
        None => Route::Landing,
    }
}

/// Where a request for the todo page ends up
pub fn todos_page_route(session: Option<&ClientSession>) -> Route {
    match session {
        Some(_) => Route::Todos,
        None => Route::SignIn,
    }
}

pub fn status_label(status: dto::TodoStatus) -> &'static str {
    match status {
        dto::TodoStatus::Pending => "Pending",
        dto::TodoStatus::InProgress => "In Progress",
        dto::TodoStatus::Done => "Done",
    }
}

/// Form state for adding a todo
#[derive(Debug, Default)]
pub struct CreateTodoForm {
    pub title: String,
    pub description: String,
    pub error: Option<String>,
    in_flight: bool,
}

impl CreateTodoForm {
    pub fn new() -> CreateTodoForm {
        CreateTodoForm::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn button_label(&self) -> &'static str {
        if self.in_flight { "Adding..." } else { "Add Todo" }
    }

    /// Starts a submission, returning the procedure input. Returns nothing when a submission is
    /// already running or the title is blank, in which case no call should be made.
    pub fn begin_submit(&mut self) -> Option<dto::NewTodo> {
        let title = self.title.trim();
        if self.in_flight || title.is_empty() {
            return None;
        }

        let description = self.description.trim();
        let new_todo = dto::NewTodo {
            title: title.to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
        };
        self.in_flight = true;
        self.error = None;

        Some(new_todo)
    }

    /// Settles a submission. Success clears the inputs and invalidates the list; failure
    /// keeps what the user typed and records the message.
    pub fn finish_submit(
        &mut self,
        result: &Result<dto::Todo, ProcedureError>,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) {
        self.in_flight = false;
        match result {
            Ok(created) => {
                debug!(todo_id = created.id, "todo created");
                self.title.clear();
                self.description.clear();
                invalidator.invalidate(list_key);
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub async fn submit(
        &mut self,
        procedures: &impl TodoProcedures,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) -> Option<Result<dto::Todo, ProcedureError>> {
        let new_todo = self.begin_submit()?;
        let result = procedures.create(&new_todo).await;
        self.finish_submit(&result, invalidator, list_key);

        Some(result)
    }
}

/// Per-row state for changing a todo's status or deleting it. Each action tracks
/// its own in-flight flag.
#[derive(Debug)]
pub struct TodoRowActions {
    pub todo_id: i32,
    pub error: Option<String>,
    updating_status: bool,
    deleting: bool,
}

impl TodoRowActions {
    pub fn new(todo_id: i32) -> TodoRowActions {
        TodoRowActions {
            todo_id,
            error: None,
            updating_status: false,
            deleting: false,
        }
    }

    pub fn is_updating_status(&self) -> bool {
        self.updating_status
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn begin_status_change(&mut self) -> bool {
        if self.updating_status {
            return false;
        }
        self.updating_status = true;
        true
    }

    pub fn finish_status_change(
        &mut self,
        result: &Result<(), ProcedureError>,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) {
        self.updating_status = false;
        self.settle(result, invalidator, list_key);
    }

    pub fn begin_delete(&mut self) -> bool {
        if self.deleting {
            return false;
        }
        self.deleting = true;
        true
    }

    pub fn finish_delete(
        &mut self,
        result: &Result<(), ProcedureError>,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) {
        self.deleting = false;
        self.settle(result, invalidator, list_key);
    }

    fn settle(
        &mut self,
        result: &Result<(), ProcedureError>,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) {
        match result {
            Ok(()) => {
                self.error = None;
                invalidator.invalidate(list_key);
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub async fn change_status(
        &mut self,
        status: dto::TodoStatus,
        procedures: &impl TodoProcedures,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) -> Option<Result<(), ProcedureError>> {
        if !self.begin_status_change() {
            return None;
        }
        let result = procedures.update_status(self.todo_id, status).await;
        self.finish_status_change(&result, invalidator, list_key);

        Some(result)
    }

    pub async fn delete(
        &mut self,
        procedures: &impl TodoProcedures,
        invalidator: &Invalidator,
        list_key: &ListKey,
    ) -> Option<Result<(), ProcedureError>> {
        if !self.begin_delete() {
            return None;
        }
        let result = procedures.delete(self.todo_id).await;
        self.finish_delete(&result, invalidator, list_key);

        Some(result)
    }
}

/// Why the auth collaborator refused a sign-in, with its message when it gave one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub message: Option<String>,
}

/// The external authentication collaborator. Only sign-in and sign-out are used here.
pub trait Authenticator {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ClientSession, AuthFailure>;
    async fn sign_out(&self, session: &ClientSession) -> Result<(), AuthFailure>;
}

#[derive(Debug, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    in_flight: bool,
}

impl SignInForm {
    pub fn new() -> SignInForm {
        SignInForm::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn button_label(&self) -> &'static str {
        if self.in_flight { "Signing in..." } else { "Sign In" }
    }

    /// Signs in and returns the session plus where to go next. On failure the error is shown
    /// inline and the form stays put.
    pub async fn submit(
        &mut self,
        authenticator: &impl Authenticator,
    ) -> Option<(ClientSession, Route)> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.error = None;

        let result = authenticator.sign_in(&self.email, &self.password).await;
        self.in_flight = false;
        match result {
            Ok(session) => {
                info!(user_id = %session.user_id, "signed in");
                Some((session, Route::Todos))
            }
            Err(failure) => {
                self.error = Some(
                    failure
                        .message
                        .unwrap_or_else(|| SIGN_IN_FAILED_MESSAGE.to_owned()),
                );
                None
            }
        }
    }
}

/// Ends the session and sends the user back to sign-in
pub async fn sign_out(
    session: &ClientSession,
    authenticator: &impl Authenticator,
) -> Result<Route, AuthFailure> {
    authenticator.sign_out(session).await?;

    Ok(Route::SignIn)
}
