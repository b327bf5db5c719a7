use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ft_calc_core::tokens::{TokenCountRequest, TokenCountResult};

use crate::error::AppError;
use crate::state::AppState;

/// POST /count-tokens
pub async fn count_tokens(
    State(state): State<AppState>,
    payload: Result<Json<TokenCountRequest>, JsonRejection>,
) -> Result<Json<TokenCountResult>, AppError> {
    let Json(req) = payload?;
    let result = state.counter.count(&req).await?;
    tracing::info!(
        mode = state.counter.mode(),
        model = req.model_or_default(),
        tokens = result.token_count,
        "counted tokens"
    );
    Ok(Json(result))
}
