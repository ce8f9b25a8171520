use super::{NarrativeError, TextGenerator};
use crate::config::NarrativeConfig;
use async_trait::async_trait;
use claude::Claude;

/// Generates boss dialogue with Claude, forcing a call to the output tool.
#[derive(Clone)]
pub struct AnthropicGenerator {
    client: Claude,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl AnthropicGenerator {
    pub fn new(client: Claude, config: &NarrativeConfig) -> Self {
        let client = match &config.model {
            Some(model) => client.with_model(model),
            None => client,
        };
        let client = match &config.api_base {
            Some(base) => client.with_api_base(base),
            None => client,
        };
        Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: &NarrativeConfig) -> Result<Self, claude::Error> {
        Ok(Self::new(Claude::from_env()?, config))
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str, tool: claude::Tool) -> Result<String, NarrativeError> {
        let raw = self
            .client
            .call_tool(prompt, tool, self.max_tokens, self.temperature)
            .await?;
        Ok(raw)
    }
}
