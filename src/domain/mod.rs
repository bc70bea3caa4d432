use thiserror::Error;
use validator::ValidationErrors;

pub mod session;
pub mod todo;

#[cfg(test)]
pub mod test_util;

/// Every way a procedure can fail. Ownership mismatches and missing todos are
/// deliberately absent: those complete as no-ops.
#[derive(Error, Debug)]
pub enum Error {
    #[error("a valid session is required")]
    Unauthorized,
    #[error("input was invalid: {0}")]
    Invalid(ValidationErrors),
    #[error("failed to {action} due to a storage failure: {cause}")]
    Storage {
        action: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

impl Error {
    /// Wraps a driven port failure with some extra info on the [action] being taken
    /// when communicating over the port
    pub(crate) fn storage_trying_to(action: &str) -> impl FnOnce(anyhow::Error) -> Error + '_ {
        move |cause| Error::Storage {
            action: action.into(),
            cause,
        }
    }
}
