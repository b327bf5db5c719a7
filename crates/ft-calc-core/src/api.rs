use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalcError, Result};

pub const OPENAI_API: &str = "https://api.openai.com/v1";

const GENERIC_FAILURE: &str = "Failed to count tokens";

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
}

impl OpenAiClient {
    /// No request timeout is set; the caller's deadline applies.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("ft-calc/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of prompt tokens `text` costs on `model`, taken from the usage
    /// block of a one-token chat completion.
    pub async fn prompt_tokens(&self, text: &str, model: &str) -> Result<u64> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: text,
            }],
            max_tokens: 1,
        };
        tracing::debug!(%model, chars = text.len(), "requesting prompt token count");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "token count request failed");
                CalcError::Upstream(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = upstream_message(&body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
            tracing::warn!(status = status.as_u16(), %message, "upstream rejected token count");
            return Err(CalcError::Upstream(message));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CalcError::Upstream(format!("malformed upstream response: {e}")))?;
        data.usage
            .and_then(|u| u.prompt_tokens)
            .ok_or_else(|| CalcError::Upstream("upstream response missing usage.prompt_tokens".into()))
    }
}

/// Extract `error.message` from an OpenAI-style error body.
fn upstream_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(String::from)
}
