use crate::domain;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;

use serde::Serialize;
use tracing::error;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{openapi, ToResponse, ToSchema};

use validator::ValidationErrors;

/// Contains diagnostic information about a failed procedure call
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Unauthorized" = (
        summary = "No valid session accompanied the call (401)",
        value = json!({
            "error_code": "unauthorized",
            "error_description": "A valid session is required to call this procedure.",
            "extra_info": null
        })
    )),

    ("Internal Failure" = (
        summary = "Storage could not complete the call (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request",
            "extra_info": null
        })
    )),

    ("Invalid Input" = (
        summary = "Procedure input failed validation (400)",
        value = json!({
            "error_code": "invalid_input",
            "error_description": "Submitted data was invalid.",
            "extra_info": {
                "title": [
                    {
                        "code": "blank",
                        "message": "title must not be blank",
                        "params": {
                            "value": "   "
                        }
                    }
                ]
            }
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "error_description": "The passed request body contained malformed or unreadable JSON.",
            "extra_info": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type for calls made without a valid session
pub struct UnauthorizedErrorResponse;

impl IntoResponse for UnauthorizedErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(BasicErrorResponse {
                error_code: "unauthorized".into(),
                error_description: "A valid session is required to call this procedure.".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                error_description: "Submitted data was invalid.".to_owned(),
                extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Response type for storage failures. The cause is logged, never sent to the caller.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        error!("procedure failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that maps each [domain::Error] kind onto its [BasicErrorResponse]
pub struct DomainErrorResponse(domain::Error);

impl IntoResponse for DomainErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            domain::Error::Unauthorized => UnauthorizedErrorResponse.into_response(),
            domain::Error::Invalid(errs) => ValidationErrorResponse(errs).into_response(),
            storage_err @ domain::Error::Storage { .. } => {
                GenericErrorResponse(anyhow::Error::new(storage_err)).into_response()
            }
        }
    }
}

impl From<domain::Error> for DomainErrorResponse {
    fn from(value: domain::Error) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description:
                    "The passed request body contained malformed or unreadable JSON.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}
