use crate::domain::Error;
use crate::external_connections::ExternalConnectivity;
use derive_more::Display;
use tracing::debug;

/// The authenticated caller behind a request, as reported by the auth provider
#[derive(PartialEq, Eq, Debug, Clone, Display)]
#[display("{name} ({id})")]
pub struct Identity {
    pub id: String,
    pub name: String,
}

/// Whatever the request presented as proof of a session. Only the token is ever consulted;
/// nothing in a request body can stand in for it.
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    pub token: Option<String>,
}

impl SessionCredentials {
    pub fn with_token(token: impl Into<String>) -> SessionCredentials {
        SessionCredentials {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> SessionCredentials {
        SessionCredentials { token: None }
    }
}

pub mod driven_ports {
    use super::*;

    /// Read-only view of the auth provider's session store
    pub trait SessionVerifier {
        /// Returns the identity owning [token] if the session exists and hasn't expired
        async fn verify(
            &self,
            token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Identity>, anyhow::Error>;
    }
}

/// Resolves the caller's identity for a single request. Must be invoked fresh on every
/// procedure call: identities are never cached between requests.
pub async fn authenticate(
    credentials: &SessionCredentials,
    ext_cxn: &mut impl ExternalConnectivity,
    verifier: &impl driven_ports::SessionVerifier,
) -> Result<Identity, Error> {
    let Some(token) = credentials.token.as_deref().filter(|token| !token.is_empty()) else {
        debug!("request carried no session credentials");
        return Err(Error::Unauthorized);
    };

    let identity = verifier
        .verify(token, &mut *ext_cxn)
        .await
        .map_err(Error::storage_trying_to("verify a session"))?;

    identity.ok_or_else(|| {
        debug!("presented session token was unknown or expired");
        Error::Unauthorized
    })
}
