//! HTTP transport client for the analyst agent endpoint.
//!
//! Issues the agent call and drives the SSE response through the decoder and
//! the accumulator fold, yielding one [`AggregatedResult`] per query.

use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use floe_core::credentials::TokenSupplier;
use floe_core::errors::TransportError;
use floe_core::result::AggregatedResult;

use crate::aggregator::{Accumulator, ResponsePolicy};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TOOL_NAME: &str = "sql_analyst_tool";
const TOOL_TYPE: &str = "cortex_analyst_text_to_sql";
const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Configuration for one agent endpoint.
#[derive(Clone, Debug)]
pub struct AnalystConfig {
    pub agent_url: String,
    pub model: String,
    pub semantic_model: String,
    pub tool_name: String,
    /// Optional token-type header value (e.g. `KEYPAIR_JWT`, `OAUTH`).
    pub token_type: Option<String>,
}

impl AnalystConfig {
    pub fn new(
        agent_url: impl Into<String>,
        model: impl Into<String>,
        semantic_model: impl Into<String>,
    ) -> Self {
        Self {
            agent_url: agent_url.into(),
            model: model.into(),
            semantic_model: semantic_model.into(),
            tool_name: DEFAULT_TOOL_NAME.into(),
            token_type: None,
        }
    }

    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }
}

/// Client for a natural-language → SQL analyst agent.
pub struct AnalystClient {
    client: Client,
    config: AnalystConfig,
    tokens: Arc<dyn TokenSupplier>,
    policy: ResponsePolicy,
}

impl AnalystClient {
    pub fn new(config: AnalystConfig, tokens: Arc<dyn TokenSupplier>) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            config,
            tokens,
            policy: ResponsePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Send one natural-language query and aggregate the streamed response.
    ///
    /// A 401 is retried exactly once after acquiring a fresh credential; any
    /// other non-success status is terminal for this query. Dropping the
    /// returned future aborts the request and releases the transport.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn ask(&self, query: &str) -> Result<AggregatedResult, TransportError> {
        let body = self.build_body(query);

        let token = self.fresh_token().await?;
        let mut response = self.send_once(&body, &token).await?;

        if response.status().as_u16() == 401 {
            warn!("agent returned 401; retrying once with a fresh credential");
            let token = self.fresh_token().await?;
            response = self.send_once(&body, &token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(TransportError::from_status(status.as_u16(), body_text));
        }

        self.aggregate_stream(response).await
    }

    async fn fresh_token(&self) -> Result<SecretString, TransportError> {
        self.tokens
            .token()
            .await
            .map_err(|e| TransportError::Credential(e.to_string()))
    }

    async fn send_once(
        &self,
        body: &Value,
        token: &SecretString,
    ) -> Result<reqwest::Response, TransportError> {
        let mut req = self
            .client
            .post(&self.config.agent_url)
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .header("content-type", "application/json")
            .header("accept", "application/json");
        if let Some(token_type) = &self.config.token_type {
            req = req.header(TOKEN_TYPE_HEADER, token_type);
        }
        req.json(body)
            .send()
            .await
            .map_err(|e| TransportError::NetworkError(e.to_string()))
    }

    fn build_body(&self, query: &str) -> Value {
        let request = AgentRequest {
            model: &self.config.model,
            messages: vec![RequestMessage {
                role: "user",
                content: vec![ContentBlock {
                    kind: "text",
                    text: query,
                }],
            }],
            tools: vec![ToolDeclaration {
                tool_spec: ToolSpec {
                    kind: TOOL_TYPE,
                    name: &self.config.tool_name,
                },
            }],
            tool_resources: json!({
                &self.config.tool_name: { "semantic_model_file": &self.config.semantic_model }
            }),
        };
        serde_json::to_value(&request).expect("agent request serializes")
    }

    /// Consume the SSE byte stream line by line and fold it into a result.
    ///
    /// No partial line ever reaches the decoder; a trailing unterminated line
    /// is processed once at end of stream. A mid-stream read failure maps to
    /// `StreamInterrupted`.
    async fn aggregate_stream(
        &self,
        response: reqwest::Response,
    ) -> Result<AggregatedResult, TransportError> {
        let mut stream = response.bytes_stream();
        let mut buffer = BytesMut::with_capacity(8192);
        let mut acc = Accumulator::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransportError::StreamInterrupted(e.to_string()))?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let mut line_bytes = buffer.split_to(newline_pos + 1);
                line_bytes.truncate(line_bytes.len() - 1);
                if line_bytes.last() == Some(&b'\r') {
                    line_bytes.truncate(line_bytes.len() - 1);
                }
                match std::str::from_utf8(&line_bytes) {
                    Ok(line) if !line.is_empty() => acc.apply_line(line),
                    Ok(_) => {}
                    Err(_) => warn!("skipping invalid UTF-8 stream line"),
                }
            }
        }

        if !buffer.is_empty() {
            if let Ok(line) = std::str::from_utf8(&buffer) {
                let line = line.trim();
                if !line.is_empty() {
                    acc.apply_line(line);
                }
            }
        }

        debug!("agent stream exhausted");
        Ok(acc.finish(&self.policy))
    }
}

// --- Request body types ---

#[derive(Serialize)]
struct AgentRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    tools: Vec<ToolDeclaration<'a>>,
    tool_resources: Value,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
struct ContentBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
struct ToolDeclaration<'a> {
    tool_spec: ToolSpec<'a>,
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_core::credentials::StaticToken;

    fn test_client() -> AnalystClient {
        let config = AnalystConfig::new(
            "https://warehouse.example.com/api/v2/cortex/agent:run",
            "claude-sonnet",
            "@db.schema.stage/model.yaml",
        );
        AnalystClient::new(config, Arc::new(StaticToken::new("test-token")))
    }

    #[test]
    fn body_declares_model_and_query() {
        let body = test_client().build_body("total revenue by month");
        assert_eq!(body["model"], "claude-sonnet");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(body["messages"][0]["content"][0]["text"], "total revenue by month");
    }

    #[test]
    fn body_binds_tool_to_semantic_model() {
        let body = test_client().build_body("q");
        assert_eq!(body["tools"][0]["tool_spec"]["type"], TOOL_TYPE);
        assert_eq!(body["tools"][0]["tool_spec"]["name"], DEFAULT_TOOL_NAME);
        assert_eq!(
            body["tool_resources"][DEFAULT_TOOL_NAME]["semantic_model_file"],
            "@db.schema.stage/model.yaml"
        );
    }

    #[test]
    fn custom_tool_name_flows_through() {
        let config = AnalystConfig::new("http://localhost", "m", "sm").with_tool_name("finance_tool");
        let client = AnalystClient::new(config, Arc::new(StaticToken::new("t")));
        let body = client.build_body("q");
        assert_eq!(body["tools"][0]["tool_spec"]["name"], "finance_tool");
        assert!(body["tool_resources"]["finance_tool"].is_object());
    }

    #[test]
    fn connect_timeout_constant() {
        assert_eq!(CONNECT_TIMEOUT, Duration::from_secs(30));
    }
}
