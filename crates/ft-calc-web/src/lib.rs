use std::sync::OnceLock;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use ft_calc_core::catalog::{self, Catalog};
use ft_calc_core::pricing::{self, PricingRequest};
use ft_calc_core::share::ShareState;
use ft_calc_core::tokens::{self, TokenCountRequest, TOKENIZER_MODELS};

static CATALOG: OnceLock<Option<Catalog>> = OnceLock::new();

/// The bundled catalog, parsed on first use.
fn bundled() -> Option<&'static Catalog> {
    CATALOG
        .get_or_init(|| catalog::load_bundled_catalog().ok())
        .as_ref()
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelJs<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    input: f64,
    cached_input: f64,
    output: f64,
    training: f64,
}

/// All models with display metadata and rates, in id order.
#[wasm_bindgen]
pub fn list_models() -> JsValue {
    let Some(catalog) = bundled() else {
        return JsValue::NULL;
    };
    let models: Vec<ModelJs> = catalog
        .iter()
        .map(|(id, m)| ModelJs {
            id,
            name: &m.name,
            description: &m.description,
            input: m.input,
            cached_input: m.cached_input,
            output: m.output,
            training: m.training,
        })
        .collect();
    to_js(&models)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Cost breakdown for a `{ model, inputTokens, outputTokens, epochs,
/// useCachedInput, useBatchApi }` object. Omitted fields take calculator
/// defaults. Throws on unknown models or invalid counts.
#[wasm_bindgen]
pub fn compute_cost(request: JsValue) -> Result<JsValue, JsError> {
    let req: PricingRequest = serde_wasm_bindgen::from_value(request)
        .map_err(|e| JsError::new(&format!("bad request: {e}")))?;
    let catalog = bundled().ok_or_else(|| JsError::new("model catalog unavailable"))?;
    let result = pricing::compute_cost(catalog, &req).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(to_js(&result))
}

/// "$1,234.57"
#[wasm_bindgen]
pub fn fmt_usd(amount: f64) -> String {
    pricing::fmt_usd(amount)
}

// ---------------------------------------------------------------------------
// Token estimate (offline heuristic; exact counts go through the server)
// ---------------------------------------------------------------------------

#[wasm_bindgen]
pub fn estimate_tokens(text: &str) -> Result<JsValue, JsError> {
    let result = tokens::estimate_heuristic(&TokenCountRequest::new(text))
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(to_js(&result))
}

#[derive(Serialize)]
struct TokenizerModelJs {
    id: &'static str,
    name: &'static str,
}

/// Models offered in the token analyzer.
#[wasm_bindgen]
pub fn tokenizer_models() -> JsValue {
    let models: Vec<TokenizerModelJs> = TOKENIZER_MODELS
        .iter()
        .map(|m| TokenizerModelJs { id: m.id, name: m.name })
        .collect();
    to_js(&models)
}

// ---------------------------------------------------------------------------
// Share links
// ---------------------------------------------------------------------------

/// Link for `{ request, tab }` rooted at `base_url`, or null if the state
/// does not deserialize or `base_url` is not an absolute URL.
#[wasm_bindgen]
pub fn share_link(base_url: &str, state: JsValue) -> JsValue {
    let state: ShareState = match serde_wasm_bindgen::from_value(state) {
        Ok(s) => s,
        Err(_) => return JsValue::NULL,
    };
    match state.share_link(base_url) {
        Ok(link) => JsValue::from_str(&link),
        Err(_) => JsValue::NULL,
    }
}

/// Calculator state from a `?model=..&input=..` query string.
#[wasm_bindgen]
pub fn parse_share_query(query: &str) -> JsValue {
    match bundled() {
        Some(catalog) => to_js(&ShareState::from_query(query, catalog)),
        None => JsValue::NULL,
    }
}
