use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// Model the upstream tokenizer is asked about when the caller gives none.
pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-4o";

/// Heuristic ratio of tokens per word, as numerator / denominator (1.3).
/// A fixed approximation for English prose, not a measured bound.
pub const TOKENS_PER_WORD_NUM: u64 = 13;
pub const TOKENS_PER_WORD_DEN: u64 = 10;

/// Attached to every heuristic result.
pub const ESTIMATE_NOTE: &str =
    "This is an estimated count. For accurate counts, configure an OpenAI API key (OPENAI_API_KEY).";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenCountRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl TokenCountRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The requested model, or [`DEFAULT_TOKENIZER_MODEL`] when absent or blank.
    pub fn model_or_default(&self) -> &str {
        match self.model.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_TOKENIZER_MODEL,
        }
    }

    /// Trimmed text, or `EmptyInput` if nothing but whitespace remains.
    pub fn trimmed_text(&self) -> Result<&str> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(CalcError::EmptyInput);
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCountResult {
    pub token_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TokenCountResult {
    pub fn is_estimate(&self) -> bool {
        self.note.is_some()
    }
}

/// `ceil(words * 1.3)` in integer arithmetic.
pub fn words_to_tokens(words: u64) -> u64 {
    (words * TOKENS_PER_WORD_NUM).div_ceil(TOKENS_PER_WORD_DEN)
}

/// Count tokens locally from the number of whitespace-delimited words.
pub fn estimate_heuristic(req: &TokenCountRequest) -> Result<TokenCountResult> {
    let words = req.trimmed_text()?.split_whitespace().count() as u64;
    Ok(TokenCountResult {
        token_count: words_to_tokens(words),
        note: Some(ESTIMATE_NOTE.to_string()),
    })
}

/// Models offered by the token analyzer. The hint sent upstream is not
/// restricted to this list.
pub struct TokenizerModel {
    pub id: &'static str,
    pub name: &'static str,
}

pub const TOKENIZER_MODELS: &[TokenizerModel] = &[
    TokenizerModel { id: "gpt-4o",        name: "GPT-4o" },
    TokenizerModel { id: "gpt-4o-mini",   name: "GPT-4o mini" },
    TokenizerModel { id: "gpt-4.1",       name: "GPT-4.1" },
    TokenizerModel { id: "gpt-4.1-mini",  name: "GPT-4.1 mini" },
    TokenizerModel { id: "gpt-3.5-turbo", name: "GPT-3.5 Turbo" },
];

/// How token counts are produced for the life of the process.
#[cfg(feature = "network")]
#[derive(Debug, Clone)]
pub enum TokenCounter {
    /// No credential configured: local word-count estimate.
    Heuristic,
    /// Ask the upstream API for prompt-token usage.
    Upstream(crate::api::OpenAiClient),
}

#[cfg(feature = "network")]
impl TokenCounter {
    /// Pick the strategy from an optional credential. A blank key counts as
    /// no key.
    pub fn from_credential(api_key: Option<String>, base_url: &str) -> Result<Self> {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok(Self::Upstream(crate::api::OpenAiClient::new(key, base_url)?)),
            None => Ok(Self::Heuristic),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Upstream(_) => "upstream",
        }
    }

    pub async fn count(&self, req: &TokenCountRequest) -> Result<TokenCountResult> {
        match self {
            Self::Heuristic => estimate_heuristic(req),
            Self::Upstream(client) => {
                req.trimmed_text()?;
                let token_count = client.prompt_tokens(&req.text, req.model_or_default()).await?;
                Ok(TokenCountResult {
                    token_count,
                    note: None,
                })
            }
        }
    }
}
