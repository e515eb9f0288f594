//! Lifecycle management for the shared warehouse session.
//!
//! One manager instance owns one session handle. Every caller goes through
//! [`SessionManager::get_session`], which funnels the read-check-refresh
//! sequence through a single lock: at most one refresh runs at a time, and no
//! two callers can tear down the same handle. The lock covers handle
//! selection only — callers execute queries after it is released.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use floe_core::credentials::TokenSupplier;

use crate::session::{SessionConnector, SessionError, WarehouseSession};

/// Sessions older than this are refreshed before reuse.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(4 * 60 * 60);

/// A live session handle plus the instant it was created.
#[derive(Clone)]
pub struct ActiveSession {
    pub session: Arc<dyn WarehouseSession>,
    pub created_at: Instant,
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl ActiveSession {
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Owns the shared warehouse session and refreshes it when stale.
///
/// A session is stale when absent, older than the configured max age, or
/// reported closed by the remote end. Refresh closes the old handle first
/// (best effort), reads a fresh credential, then connects. If creation fails
/// the slot is left empty so a later call can retry; no half-open handle is
/// ever retained.
pub struct SessionManager {
    connector: Arc<dyn SessionConnector>,
    tokens: Arc<dyn TokenSupplier>,
    max_age: Duration,
    state: Mutex<Option<ActiveSession>>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn SessionConnector>, tokens: Arc<dyn TokenSupplier>) -> Self {
        Self {
            connector,
            tokens,
            max_age: DEFAULT_MAX_AGE,
            state: Mutex::new(None),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Seed the manager with a pre-existing handle, stamped now.
    pub fn with_initial_session(mut self, session: Arc<dyn WarehouseSession>) -> Self {
        self.state = Mutex::new(Some(ActiveSession {
            session,
            created_at: Instant::now(),
        }));
        self
    }

    /// Return a valid session, refreshing first if the current one is stale.
    #[instrument(skip_all)]
    pub async fn get_session(&self) -> Result<ActiveSession, SessionError> {
        let mut slot = self.state.lock().await;

        if let Some(active) = slot.as_ref() {
            if !self.is_stale(active) {
                return Ok(active.clone());
            }
            info!(age_secs = active.age().as_secs(), "current session is stale; refreshing");
        }

        // Tear down the old handle before creating its replacement, so the
        // external resource is not leaked. Close failures are logged only.
        if let Some(old) = slot.take() {
            if !old.session.is_closed() {
                if let Err(e) = old.session.close().await {
                    warn!(error = %e, "failed to close stale session");
                }
            }
        }

        let token = self.tokens.token().await?;
        let session = self.connector.connect(token).await?;
        let active = ActiveSession {
            session,
            created_at: Instant::now(),
        };
        *slot = Some(active.clone());
        info!("new warehouse session established");
        Ok(active)
    }

    fn is_stale(&self, active: &ActiveSession) -> bool {
        active.age() > self.max_age || active.session.is_closed()
    }
}
