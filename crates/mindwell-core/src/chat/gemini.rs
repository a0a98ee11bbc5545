//! Gemini `generateContent` REST client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::client::{CompletionClient, FALLBACK_REPLY};
use super::{ChatTurn, Role};
use crate::error::CompletionError;
use crate::storage::ChatConfig;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build from configuration. `api_key` is resolved by the caller
    /// (environment first, then file).
    pub fn from_config(config: &ChatConfig, api_key: Option<String>) -> Result<Self, CompletionError> {
        let key = api_key.ok_or_else(|| {
            CompletionError::NotConfigured("set chat.api_key or MINDWELL_GEMINI_API_KEY".into())
        })?;
        Ok(Self::new(&config.endpoint, &config.model, key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> Result<Url, CompletionError> {
        let base = self.endpoint.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/models/{}:generateContent", self.model))
            .map_err(|e| CompletionError::NotConfigured(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String, CompletionError> {
        let body = GenerateContentRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: Some(turn.role),
                    parts: vec![Part {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
        };

        let response = self.http.post(self.url()?).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "completion request rejected");
            return Err(CompletionError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        Ok(extract_text(parsed).unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.is_empty())
}
