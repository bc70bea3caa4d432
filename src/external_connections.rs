use sqlx::PgConnection;

/// A handle to an active database connection, whether it came straight from a pool
/// or from somewhere else
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Provides access to the external systems the service talks to. Driven adapters receive
/// this instead of concrete clients so business logic never names them and tests can
/// substitute fakes.
pub trait ExternalConnectivity: Send + Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    /// Acquires a database connection for the duration of the returned handle
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}
