use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use floe_core::credentials::CredentialError;
use floe_core::table::TabularResult;

/// Errors from session creation, teardown, and query execution.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session creation failed: {0}")]
    Creation(String),
    #[error("credential unavailable: {0}")]
    Credential(#[from] CredentialError),
    #[error("failed to close session: {0}")]
    Close(String),
    #[error("query execution failed: {0}")]
    Query(String),
}

/// An open warehouse session.
///
/// The manager owns the handle; callers receive a shared reference valid
/// until the next refresh and must not hold it past one unit of work.
#[async_trait]
pub trait WarehouseSession: Send + Sync {
    /// Whether the remote end has closed this session.
    fn is_closed(&self) -> bool;

    /// Tear the session down. Idempotent; closing a closed session is a no-op.
    async fn close(&self) -> Result<(), SessionError>;

    /// Execute a query and return its result set.
    async fn execute(&self, sql: &str) -> Result<TabularResult, SessionError>;
}

/// Creates warehouse sessions from a bearer credential.
///
/// The credential is supplied fresh at every connect; implementations must
/// not cache it.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, token: SecretString)
        -> Result<Arc<dyn WarehouseSession>, SessionError>;
}
