use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::SecretString;

/// Failure to produce a bearer credential.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("could not read credential from {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("credential is empty")]
    Empty,
}

/// Supplies the bearer credential used to authenticate outbound calls.
///
/// Implementations must return the credential that is valid *now* — callers
/// invoke this at the moment of each request or session refresh and never
/// cache the result across refreshes.
#[async_trait]
pub trait TokenSupplier: Send + Sync {
    async fn token(&self) -> Result<SecretString, CredentialError>;
}

/// A pre-minted opaque bearer token (e.g. a key-pair JWT minted out of band).
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

#[async_trait]
impl TokenSupplier for StaticToken {
    async fn token(&self) -> Result<SecretString, CredentialError> {
        Ok(self.token.clone())
    }
}

/// Reads the platform-refreshed token file on every call.
///
/// The platform rotates the file contents out of band, so the file is read
/// fresh each time rather than at construction.
pub struct FileToken {
    path: PathBuf,
}

impl FileToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenSupplier for FileToken {
    async fn token(&self) -> Result<SecretString, CredentialError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CredentialError::Unreadable {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(SecretString::from(trimmed.to_string()))
    }
}
