use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use ft_calc_core::pricing::{compute_cost, PricingRequest, PricingResult};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Catalog entry as exposed to UI clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub input: f64,
    pub cached_input: f64,
    pub output: f64,
    pub training: f64,
}

/// GET /models
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelEntry>> {
    let models = state
        .catalog
        .iter()
        .map(|(id, m)| ModelEntry {
            id: id.to_string(),
            name: m.name.clone(),
            description: m.description.clone(),
            input: m.input,
            cached_input: m.cached_input,
            output: m.output,
            training: m.training,
        })
        .collect();
    Json(models)
}

/// POST /cost
pub async fn compute(
    State(state): State<AppState>,
    payload: Result<Json<PricingRequest>, JsonRejection>,
) -> Result<Json<PricingResult>, AppError> {
    let Json(req) = payload?;
    Ok(Json(compute_cost(&state.catalog, &req)?))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ft_calc_core::catalog::load_bundled_catalog;
    use ft_calc_core::tokens::TokenCounter;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;

    fn app() -> axum::Router {
        build_router(AppState::new(load_bundled_catalog().unwrap(), TokenCounter::Heuristic))
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_cost(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/cost")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn models_lists_catalog() {
        let req = Request::builder().uri("/models").body(Body::empty()).unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        let models = body.as_array().unwrap();
        assert_eq!(models.len(), 4);
        let gpt4o = models.iter().find(|m| m["id"] == "gpt-4o").unwrap();
        assert_eq!(gpt4o["name"], "GPT-4o");
        assert_eq!(gpt4o["cachedInput"], 1.875);
    }

    #[tokio::test]
    async fn cost_for_worked_example() {
        let (status, body) = send(post_cost(
            r#"{"model":"gpt-4o","inputTokens":100000,"outputTokens":20000,"epochs":3,"useBatchApi":true}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        let total = body["totalCost"].as_f64().unwrap();
        assert!((total - 7.8375).abs() < 1e-9, "total {total}");
        let training = body["trainingCost"].as_f64().unwrap();
        assert!((training - 7.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn cost_unknown_model_is_bad_request() {
        let (status, body) = send(post_cost(r#"{"model":"gpt-2"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown model: gpt-2");
    }

    #[tokio::test]
    async fn cost_zero_epochs_is_bad_request() {
        let (status, body) = send(post_cost(r#"{"model":"gpt-4o","epochs":0}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("epochs"));
    }
}
