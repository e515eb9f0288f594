pub mod manager;
pub mod session;

pub use manager::{ActiveSession, SessionManager, DEFAULT_MAX_AGE};
pub use session::{SessionConnector, SessionError, WarehouseSession};
