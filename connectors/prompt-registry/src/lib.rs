//! Prompt registry client (C4): fetches versioned prompt templates with
//! variable interpolation, memoizing raw templates in a concurrent TTL
//! cache keyed by `(name, label-or-version)`.

use async_trait::async_trait;
use dashmap::DashMap;
use orchestrator_core::errors::PromptError;
use orchestrator_core::traits::{ChatMessage, PromptBody, PromptRegistry, RenderedPrompt};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

mod config;
pub use config::PromptRegistryConfig;

#[derive(Clone)]
struct CachedTemplate {
    body: PromptBody,
    version: String,
    fetched_at: Instant,
}

pub struct HttpPromptRegistry {
    client: reqwest::Client,
    config: PromptRegistryConfig,
    cache: DashMap<(String, String), CachedTemplate>,
}

impl HttpPromptRegistry {
    pub fn new(config: PromptRegistryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("failed to build prompt registry http client");
        Self {
            client,
            config,
            cache: DashMap::new(),
        }
    }

    fn cache_key(name: &str, label_or_version: &str) -> (String, String) {
        (name.to_string(), label_or_version.to_string())
    }

    async fn fetch_raw(&self, name: &str, label_or_version: &str) -> Result<CachedTemplate, PromptError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let url = format!("{}/v2/prompts/{name}", self.config.api_base);
            let result = self
                .client
                .get(&url)
                .query(&[("label", label_or_version)])
                .bearer_auth(&self.config.api_key)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    let parsed: PromptApiResponse = response.json().await.map_err(|e| {
                        PromptError::RequestFailed(format!("malformed prompt response: {e}"))
                    })?;
                    let body = if let Some(messages) = parsed.prompt_chat {
                        PromptBody::Chat {
                            messages: messages
                                .into_iter()
                                .map(|m| ChatMessage {
                                    role: m.role,
                                    content: m.content,
                                })
                                .collect(),
                        }
                    } else if let Some(text) = parsed.prompt_text {
                        PromptBody::Text { body: text }
                    } else {
                        return Err(PromptError::RequestFailed(
                            "prompt response had neither text nor chat body".to_string(),
                        ));
                    };
                    return Ok(CachedTemplate {
                        body,
                        version: parsed.version,
                        fetched_at: Instant::now(),
                    });
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    return Err(PromptError::Missing {
                        name: name.to_string(),
                        label: label_or_version.to_string(),
                    });
                }
                _ if attempt <= self.config.max_retries => {
                    warn!(attempt, name, "prompt registry fetch failed, retrying");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
                _ => {
                    return Err(PromptError::Missing {
                        name: name.to_string(),
                        label: label_or_version.to_string(),
                    });
                }
            }
        }
    }

    fn interpolate(mut body: PromptBody, variables: &[(&str, &str)]) -> PromptBody {
        for (key, value) in variables {
            body = body.interpolate(key, value);
        }
        body
    }
}

#[async_trait]
impl PromptRegistry for HttpPromptRegistry {
    async fn fetch(
        &self,
        name: &str,
        label_or_version: &str,
        variables: &[(&str, &str)],
    ) -> Result<RenderedPrompt, PromptError> {
        let key = Self::cache_key(name, label_or_version);
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);

        if let Some(cached) = self.cache.get(&key) {
            if cached.fetched_at.elapsed() <= ttl {
                debug!(name, label_or_version, "prompt cache hit");
                return Ok(RenderedPrompt {
                    body: Self::interpolate(cached.body.clone(), variables),
                    name: name.to_string(),
                    version: cached.version.clone(),
                });
            }
        }

        let fetched = self.fetch_raw(name, label_or_version).await?;
        let rendered = RenderedPrompt {
            body: Self::interpolate(fetched.body.clone(), variables),
            name: name.to_string(),
            version: fetched.version.clone(),
        };
        self.cache.insert(key, fetched);
        Ok(rendered)
    }

    async fn fetch_no_cache(
        &self,
        name: &str,
        label_or_version: &str,
        variables: &[(&str, &str)],
    ) -> Result<RenderedPrompt, PromptError> {
        let fetched = self.fetch_raw(name, label_or_version).await?;
        Ok(RenderedPrompt {
            body: Self::interpolate(fetched.body, variables),
            name: name.to_string(),
            version: fetched.version,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PromptApiResponse {
    version: String,
    #[serde(rename = "prompt")]
    prompt_text: Option<String>,
    #[serde(rename = "chatPrompt")]
    prompt_chat: Option<Vec<ChatMessageWire>>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageWire {
    role: String,
    content: String,
}
