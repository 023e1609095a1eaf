use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize")))
        .expect("request")
}

fn calculate_payload() -> Value {
    json!({
        "submitter": "user-ash",
        "attributes": {
            "kind": "art",
            "quality": "rendered",
            "backgrounds": ["simple"],
            "characters": [
                {
                    "recipient": { "kind": "trainer", "id": 1 },
                    "appearance": "fullBody"
                },
                {
                    "recipient": { "kind": "monster", "id": 10, "trainer_id": 1 },
                    "appearance": "halfBody",
                    "complexity": "average"
                }
            ]
        }
    })
}

#[tokio::test]
async fn calculate_endpoint_returns_a_bundle() {
    let (router, _, _, _) = build_router();

    let response = router
        .oneshot(post_json("/api/v1/rewards/calculate", &calculate_payload()))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    assert_eq!(payload.get("kind"), Some(&json!("art")));
    assert_eq!(payload.get("overall_levels"), Some(&json!(10)));
    assert_eq!(payload.get("total_coins"), Some(&json!(1550)));
    assert_eq!(
        payload
            .get("lines")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn calculate_endpoint_rejects_invalid_attributes() {
    let (router, _, _, _) = build_router();
    let payload = json!({
        "submitter": "user-ash",
        "attributes": {
            "kind": "writing",
            "word_count": 500
        }
    });

    let response = router
        .oneshot(post_json("/api/v1/rewards/calculate", &payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let payload = read_json(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("participant"));
}

#[tokio::test]
async fn finalize_endpoint_reports_opened_pools() {
    let (router, _, _, service) = build_router();
    let bundle = service
        .calculate(&ctx(), &gift_art_attributes())
        .expect("bundle computes");

    let payload = json!({
        "submitter": "user-ash",
        "submission_id": "sub-http-1",
        "bundle": serde_json::to_value(&bundle).expect("bundle serializes"),
    });

    let response = router
        .oneshot(post_json("/api/v1/rewards/finalize", &payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json(response).await;
    let pools = payload
        .get("pools")
        .and_then(Value::as_array)
        .expect("pools array");
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].get("kind"), Some(&json!("gift")));
    assert_eq!(pools[0].get("total_units"), Some(&json!(16)));
}

#[tokio::test]
async fn allocation_endpoints_drive_the_pool_lifecycle() {
    let (router, _, _, service) = build_router();
    let bundle = service
        .calculate(&ctx(), &gift_art_attributes())
        .expect("bundle computes");
    let outcome = service
        .finalize(&ctx(), submission_id("http-2"), &bundle)
        .expect("finalize succeeds");
    let pool_id = outcome.pools[0].pool_id.clone();

    // Successful allocation.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/allocations/{pool_id}"),
            &json!({ "recipient_kind": "trainer", "recipient_id": 1, "units": 4 }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let record = read_json(response).await;
    assert_eq!(record.get("units"), Some(&json!(4)));
    assert_eq!(record.get("coins_awarded"), Some(&json!(200)));

    // History view reflects the draw.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/allocations/{pool_id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = read_json(response).await;
    assert_eq!(snapshot.get("remaining"), Some(&json!(12)));
    assert_eq!(
        snapshot
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(1)
    );

    // Requests beyond the remainder conflict.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/allocations/{pool_id}"),
            &json!({ "recipient_kind": "trainer", "recipient_id": 1, "units": 13 }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Foreign-owned recipients are forbidden.
    let response = router
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/allocations/{pool_id}"),
            &json!({ "recipient_kind": "monster", "recipient_id": 20, "units": 1 }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Explicit close forfeits what is left.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/allocations/{pool_id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let closed = read_json(response).await;
    assert_eq!(closed.get("status"), Some(&json!("closed")));
    assert_eq!(closed.get("forfeited_units"), Some(&json!(12)));
}

#[tokio::test]
async fn unknown_pools_return_not_found() {
    let (router, _, _, _) = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/allocations/pool-missing")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
