use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use floe_agent::{AnalystConfig, ResponsePolicy};
use floe_core::credentials::{FileToken, StaticToken, TokenSupplier};

/// Where the bearer credential comes from.
///
/// A file-backed credential is re-read at every use, so an external process
/// may rotate it without a restart.
#[derive(Clone, Debug)]
pub enum TokenSource {
    Inline(String),
    File(PathBuf),
}

impl TokenSource {
    pub fn supplier(&self) -> Arc<dyn TokenSupplier> {
        match self {
            TokenSource::Inline(token) => Arc::new(StaticToken::new(token.clone())),
            TokenSource::File(path) => Arc::new(FileToken::new(path.clone())),
        }
    }
}

/// Runtime configuration, read from FLOE_* environment variables.
#[derive(Clone, Debug)]
pub struct FloeConfig {
    pub agent_url: String,
    pub model: String,
    pub semantic_model: String,
    pub tool_name: Option<String>,
    pub token_source: TokenSource,
    /// Value for the token-type header (e.g. `KEYPAIR_JWT`, `OAUTH`).
    pub token_type: Option<String>,
    pub redirect_text: Option<String>,
}

impl FloeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Split out from [`from_env`]
    /// so tests do not touch process-global state.
    ///
    /// [`from_env`]: FloeConfig::from_env
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name).with_context(|| format!("missing required environment variable {name}"))
        };

        let token_source = match (lookup("FLOE_TOKEN"), lookup("FLOE_TOKEN_FILE")) {
            (Some(_), Some(_)) => {
                bail!("FLOE_TOKEN and FLOE_TOKEN_FILE are mutually exclusive; set one")
            }
            (Some(token), None) => TokenSource::Inline(token),
            (None, Some(path)) => TokenSource::File(PathBuf::from(path)),
            (None, None) => bail!("no credential configured; set FLOE_TOKEN or FLOE_TOKEN_FILE"),
        };

        Ok(Self {
            agent_url: required("FLOE_AGENT_URL")?,
            model: required("FLOE_MODEL")?,
            semantic_model: required("FLOE_SEMANTIC_MODEL")?,
            tool_name: lookup("FLOE_TOOL_NAME"),
            token_source,
            token_type: lookup("FLOE_TOKEN_TYPE"),
            redirect_text: lookup("FLOE_REDIRECT_TEXT"),
        })
    }

    pub fn analyst_config(&self) -> AnalystConfig {
        let mut config = AnalystConfig::new(
            self.agent_url.clone(),
            self.model.clone(),
            self.semantic_model.clone(),
        );
        if let Some(name) = &self.tool_name {
            config = config.with_tool_name(name.clone());
        }
        if let Some(token_type) = &self.token_type {
            config = config.with_token_type(token_type.clone());
        }
        config
    }

    pub fn response_policy(&self) -> ResponsePolicy {
        match &self.redirect_text {
            Some(text) => ResponsePolicy::with_redirect(text.clone()),
            None => ResponsePolicy::default(),
        }
    }
}
