//! Minimal Anthropic Claude API client.
//!
//! Only the non-streaming Messages endpoint is supported. Structured output is
//! obtained by offering a single tool and forcing the model to call it, then
//! reading the tool input back with [`Response::tool_input`].

mod types;
mod wire;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;

pub use types::{ContentBlock, Message, Request, Response, Role, StopReason, Tool, ToolChoice, Usage};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Errors that can occur when using the Claude client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error came from talking to the service rather than from
    /// what the service sent back.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Error::Parse(_))
    }
}

/// Claude API client.
#[derive(Clone)]
pub struct Claude {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl Claude {
    /// Create a new Claude client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a Claude client from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| Error::NoApiKey)?;
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }
        Ok(Self::new(api_key))
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API base (proxies, gateways).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the full response.
    pub async fn complete(&self, request: Request) -> Result<Response, Error> {
        let body = wire::ApiRequest::from_request(&request, &self.model);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        let api_response: wire::ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(api_response.into())
    }

    /// Force the model to call `tool` once and return the tool input as JSON text.
    pub async fn call_tool(
        &self,
        prompt: impl Into<String>,
        tool: Tool,
        max_tokens: usize,
        temperature: Option<f32>,
    ) -> Result<String, Error> {
        let name = tool.name.clone();
        let mut request = Request::new(vec![Message::user(prompt)])
            .with_max_tokens(max_tokens)
            .with_tools(vec![tool])
            .with_tool_choice(ToolChoice::tool(name.clone()));
        if let Some(temperature) = temperature {
            request = request.with_temperature(temperature);
        }

        let response = self.complete(request).await?;
        response
            .tool_input(&name)
            .map(|input| input.to_string())
            .ok_or_else(|| Error::Parse(format!("model did not call tool `{name}`")))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }
}
