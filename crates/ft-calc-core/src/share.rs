// Share links: calculator state round-tripped through URL query parameters
// (model, input, output, epochs, cached, batch, tab).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::catalog::Catalog;
use crate::error::{CalcError, Result};
use crate::pricing::PricingRequest;

/// Calculator view selected when a share link is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    Calculator,
    TokenAnalyzer,
    About,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Calculator => "calculator",
            Tab::TokenAnalyzer => "token-analyzer",
            Tab::About => "about",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "calculator" => Ok(Self::Calculator),
            "token-analyzer" => Ok(Self::TokenAnalyzer),
            "about" => Ok(Self::About),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareState {
    pub request: PricingRequest,
    pub tab: Tab,
}

impl ShareState {
    pub fn new(request: PricingRequest, tab: Tab) -> Self {
        Self { request, tab }
    }

    fn pairs(&self) -> [(&'static str, String); 7] {
        let r = &self.request;
        [
            ("model", r.model.clone()),
            ("input", r.input_tokens.to_string()),
            ("output", r.output_tokens.to_string()),
            ("epochs", r.epochs.to_string()),
            ("cached", r.use_cached_input.to_string()),
            ("batch", r.use_batch_api.to_string()),
            ("tab", self.tab.to_string()),
        ]
    }

    /// Encode as `model=..&input=..&output=..&epochs=..&cached=..&batch=..&tab=..`.
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    /// Full link: `base_url` with any existing query and fragment replaced by ours.
    pub fn share_link(&self, base_url: &str) -> Result<String> {
        let mut url = Url::parse(base_url).map_err(|e| CalcError::InvalidParameter {
            name: "baseUrl",
            reason: e.to_string(),
        })?;
        url.set_fragment(None);
        url.set_query(None);
        url.query_pairs_mut().extend_pairs(self.pairs());
        Ok(url.into())
    }

    /// Decode a query string (with or without a leading `?`), starting from
    /// the calculator defaults. Unknown models, unknown tabs, and counts that
    /// are unparsable or out of range leave the default in place; `cached`
    /// and `batch` are true only for the literal `true`.
    pub fn from_query(query: &str, catalog: &Catalog) -> Self {
        let mut state = ShareState::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let r = &mut state.request;
            match key.as_ref() {
                "model" if catalog.contains(&value) => r.model = value.into_owned(),
                "input" => set_count(&mut r.input_tokens, &value, 0),
                "output" => set_count(&mut r.output_tokens, &value, 0),
                "epochs" => set_count(&mut r.epochs, &value, 1),
                "cached" if !value.is_empty() => r.use_cached_input = value == "true",
                "batch" if !value.is_empty() => r.use_batch_api = value == "true",
                "tab" => {
                    if let Ok(tab) = value.parse() {
                        state.tab = tab;
                    }
                }
                _ => {}
            }
        }
        state
    }
}

/// Overwrite `slot` only when `value` is an integer no smaller than `min`.
fn set_count(slot: &mut i64, value: &str, min: i64) {
    match value.trim().parse() {
        Ok(n) if n >= min => *slot = n,
        _ => {}
    }
}
