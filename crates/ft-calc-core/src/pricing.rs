use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{CalcError, Result};

/// Rates in the catalog are quoted per this many tokens.
pub const TOKENS_PER_RATE_UNIT: f64 = 1_000_000.0;

/// Multiplier applied to inference costs when the Batch API is used.
pub const BATCH_API_MULTIPLIER: f64 = 0.5;

/// Model preselected by the calculator.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Parameters for one cost computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingRequest {
    #[serde(alias = "modelId")]
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub epochs: i64,
    pub use_cached_input: bool,
    pub use_batch_api: bool,
}

impl Default for PricingRequest {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            input_tokens: 100_000,
            output_tokens: 20_000,
            epochs: 3,
            use_cached_input: false,
            use_batch_api: false,
        }
    }
}

/// Cost breakdown in USD. Values are unrounded; use [`fmt_usd`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub training_cost: f64,
    pub inference_input_cost: f64,
    pub inference_output_cost: f64,
    pub total_cost: f64,
}

/// Compute training and inference cost for a request against the catalog.
///
/// Training is charged on input tokens once per epoch. The cached-input rate
/// replaces the input rate when requested, and the Batch API discount halves
/// both inference components but never touches training.
pub fn compute_cost(catalog: &Catalog, req: &PricingRequest) -> Result<PricingResult> {
    let entry = catalog
        .get(&req.model)
        .ok_or_else(|| CalcError::UnknownModel(req.model.clone()))?;

    if req.input_tokens < 0 {
        return Err(CalcError::InvalidParameter {
            name: "inputTokens",
            reason: format!("must be >= 0, got {}", req.input_tokens),
        });
    }
    if req.output_tokens < 0 {
        return Err(CalcError::InvalidParameter {
            name: "outputTokens",
            reason: format!("must be >= 0, got {}", req.output_tokens),
        });
    }
    if req.epochs < 1 {
        return Err(CalcError::InvalidParameter {
            name: "epochs",
            reason: format!("must be >= 1, got {}", req.epochs),
        });
    }

    let input_tokens = req.input_tokens as f64;
    let output_tokens = req.output_tokens as f64;

    let training_cost =
        (entry.training / TOKENS_PER_RATE_UNIT) * input_tokens * req.epochs as f64;

    let input_rate = if req.use_cached_input {
        entry.cached_input
    } else {
        entry.input
    };
    let raw_input_cost = (input_rate / TOKENS_PER_RATE_UNIT) * input_tokens;
    let raw_output_cost = (entry.output / TOKENS_PER_RATE_UNIT) * output_tokens;

    let batch_multiplier = if req.use_batch_api {
        BATCH_API_MULTIPLIER
    } else {
        1.0
    };
    let inference_input_cost = raw_input_cost * batch_multiplier;
    let inference_output_cost = raw_output_cost * batch_multiplier;

    Ok(PricingResult {
        training_cost,
        inference_input_cost,
        inference_output_cost,
        total_cost: training_cost + inference_input_cost + inference_output_cost,
    })
}

/// Format a dollar amount as "$1,234.57".
pub fn fmt_usd(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Format a token count with thousands separators: 100000 -> "100,000".
pub fn fmt_tokens(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
