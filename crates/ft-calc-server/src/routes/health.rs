use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub token_counter: &'static str,
    pub models: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        token_counter: state.counter.mode(),
        models: state.catalog.len(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ft_calc_core::catalog::load_bundled_catalog;
    use ft_calc_core::tokens::TokenCounter;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;

    #[tokio::test]
    async fn health_reports_mode() {
        let app = build_router(AppState::new(load_bundled_catalog().unwrap(), TokenCounter::Heuristic));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["tokenCounter"], "heuristic");
        assert_eq!(parsed["models"], 4);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build_router(AppState::new(load_bundled_catalog().unwrap(), TokenCounter::Heuristic));
        let req = Request::builder().uri("/nonexistent").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
