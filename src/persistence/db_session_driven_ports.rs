use crate::domain;
use crate::domain::session::Identity;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::{query_as, FromRow};

/// Verifies session tokens against the auth provider's tables. Only ever reads them:
/// issuing and expiring sessions is the provider's job.
pub struct DbSessionVerifier;

#[derive(FromRow)]
struct SessionOwnerRow {
    user_id: String,
    name: String,
}

impl From<SessionOwnerRow> for Identity {
    fn from(value: SessionOwnerRow) -> Self {
        Identity {
            id: value.user_id,
            name: value.name,
        }
    }
}

impl domain::session::driven_ports::SessionVerifier for DbSessionVerifier {
    async fn verify(
        &self,
        token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Identity>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let owner = query_as::<_, SessionOwnerRow>(
            r#"SELECT s.user_id, u.name FROM session s
               JOIN "user" u ON u.id = s.user_id
               WHERE s.token = $1 AND s.expires_at > now()"#,
        )
        .bind(token)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("looking up the owner of a session token")?;

        Ok(owner.map(Identity::from))
    }
}
