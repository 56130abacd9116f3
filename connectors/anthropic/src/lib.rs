//! Anthropic Messages API connector (C5): the sole LLM backend used for
//! planning, Cypher generation, and response synthesis. Retries transient
//! failures with exponential backoff starting at one second, and bounds
//! every attempt with the configured per-call timeout.

use async_trait::async_trait;
use orchestrator_core::errors::LlmError;
use orchestrator_core::traits::{
    ChatMessage, CompletionResult, LlmConnector, PromptBinding, SpanAttributes, Usage,
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn, Span};

mod config;
mod models;

pub use config::AnthropicConfig;
use models::*;

pub struct AnthropicConnector {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicConnector {
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn convert_messages(messages: &[ChatMessage]) -> (Option<String>, Vec<Message>) {
        let mut system = None;
        let mut converted = Vec::with_capacity(messages.len());
        for m in messages {
            if m.role == "system" {
                system = Some(m.content.clone());
                continue;
            }
            let role = if m.role == "assistant" { "assistant" } else { "user" };
            converted.push(Message::new(role, &m.content));
        }
        (system, converted)
    }

    /// Approximate per-1k-token pricing, matched by model-name prefix since
    /// Anthropic ships dated snapshots of each family (`-20241022`, etc).
    fn calculate_cost(&self, model: &str, usage: &UsageWire) -> f64 {
        let (input_per_1k, output_per_1k) = if model.starts_with("claude-3-opus") {
            (0.015, 0.075)
        } else if model.starts_with("claude-3-5-sonnet") || model.starts_with("claude-3-sonnet") {
            (0.003, 0.015)
        } else if model.starts_with("claude-3-5-haiku") || model.starts_with("claude-3-haiku") {
            (0.0008, 0.004)
        } else {
            (0.003, 0.015)
        };

        (usage.input_tokens as f64 / 1000.0) * input_per_1k
            + (usage.output_tokens as f64 / 1000.0) * output_per_1k
    }

    async fn send_once(&self, request: &MessageRequest) -> Result<MessageResponse, LlmError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.api_base))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("anthropic api error {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParseError(format!("malformed completion response: {e}")))
    }
}

impl SpanAttributes for AnthropicConnector {
    fn record_gen_ai(&self, system: &str, request_model: &str, response_model: &str, usage: &Usage) {
        let span = Span::current();
        span.record("gen_ai.system", system);
        span.record("gen_ai.request.model", request_model);
        span.record("gen_ai.response.model", response_model);
        span.record("gen_ai.usage.input_tokens", usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", usage.output_tokens);
        span.record("gen_ai.usage.total_tokens", usage.total_tokens);
        span.record("gen_ai.usage.cost_usd", usage.cost_usd);
    }
}

#[async_trait]
impl LlmConnector for AnthropicConnector {
    #[instrument(
        name = "llm-completion",
        skip(self, messages, prompt_binding),
        fields(
            gen_ai.system = tracing::field::Empty,
            gen_ai.request.model = tracing::field::Empty,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.usage.total_tokens = tracing::field::Empty,
            gen_ai.usage.cost_usd = tracing::field::Empty,
            langfuse.observation.prompt.name = tracing::field::Empty,
            langfuse.observation.prompt.version = tracing::field::Empty,
        )
    )]
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        prompt_binding: Option<PromptBinding>,
    ) -> Result<CompletionResult, LlmError> {
        let (system, converted) = Self::convert_messages(messages);
        let request = MessageRequest {
            model: model.to_string(),
            messages: converted,
            system,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        if let Some(binding) = &prompt_binding {
            debug!(prompt_name = %binding.name, prompt_version = %binding.version, model, "dispatching completion");
            let span = Span::current();
            span.record("langfuse.observation.prompt.name", binding.name.as_str());
            span.record("langfuse.observation.prompt.version", binding.version.as_str());
        }

        let deadline = Duration::from_millis(self.config.timeout_ms);
        let mut attempt = 0u32;
        let message_response = loop {
            let attempt_result = tokio::time::timeout(deadline, self.send_once(&request)).await;
            match attempt_result {
                Ok(Ok(response)) => break response,
                Ok(Err(err)) if attempt < self.config.max_retries => {
                    let backoff = Duration::from_secs(1 << attempt);
                    warn!(attempt, error = %err, "anthropic completion failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Ok(Err(err)) => return Err(err),
                Err(_) if attempt < self.config.max_retries => {
                    let backoff = Duration::from_secs(1 << attempt);
                    warn!(attempt, "anthropic completion timed out, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(_) => return Err(LlmError::Timeout),
            }
        };

        let text = message_response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(LlmError::ResponseParseError("no text content in response".to_string()));
        }

        let usage = message_response
            .usage
            .as_ref()
            .map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
                cost_usd: self.calculate_cost(&message_response.model, u),
            })
            .unwrap_or_default();

        self.record_gen_ai("anthropic", model, &message_response.model, &usage);

        Ok(CompletionResult {
            text,
            usage,
            model_used: message_response.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_message_is_split_out_of_the_conversation() {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: "be terse".to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            },
        ];
        let (system, converted) = AnthropicConnector::convert_messages(&messages);
        assert_eq!(system.as_deref(), Some("be terse"));
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].role, "user");
    }

    #[test]
    fn unknown_models_fall_back_to_sonnet_pricing() {
        let connector = AnthropicConnector::new(AnthropicConfig::new("test-key")).unwrap();
        let usage = UsageWire {
            input_tokens: 1000,
            output_tokens: 1000,
        };
        let cost = connector.calculate_cost("some-future-model", &usage);
        assert!((cost - 0.018).abs() < 1e-9);
    }

    #[tokio::test]
    async fn connector_construction_succeeds_with_an_api_key() {
        let connector = AnthropicConnector::new(AnthropicConfig::new("test-key"));
        assert!(connector.is_ok());
    }
}
