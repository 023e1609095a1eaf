use crate::infra::{AppState, InMemoryRoster, LoggingProgressSink};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use reward_engine::workflows::submissions::{reward_router, RewardService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_reward_routes(
    service: Arc<RewardService<InMemoryRoster, LoggingProgressSink>>,
) -> axum::Router {
    reward_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{default_scoring_config, seed_roster};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let roster = Arc::new(InMemoryRoster::default());
        seed_roster(&roster);
        let progress = Arc::new(LoggingProgressSink::default());
        let service = Arc::new(RewardService::new(
            roster,
            progress,
            default_scoring_config(),
        ));
        with_reward_routes(service)
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let router = build_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("status"), Some(&serde_json::json!("ok")));
    }

    #[tokio::test]
    async fn calculate_endpoint_is_mounted() {
        let router = build_router();
        let payload = serde_json::json!({
            "submitter": "user-ash",
            "attributes": {
                "kind": "writing",
                "word_count": 240,
                "participants": [
                    { "kind": "trainer", "id": 1 },
                    { "kind": "monster", "id": 10, "trainer_id": 1 }
                ]
            }
        });

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/rewards/calculate")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("overall_levels"), Some(&serde_json::json!(4)));
    }
}
