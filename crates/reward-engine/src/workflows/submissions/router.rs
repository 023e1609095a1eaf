use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{RewardBundle, SubmissionAttributes, SubmissionId, UserId};
use super::ledger::{LedgerError, PoolId};
use super::repository::{ProgressSink, RecipientRepository};
use super::service::{RecipientKind, RewardService, RewardServiceError, SubmissionContext};

/// Router builder exposing the reward calculation and allocation endpoints.
pub fn reward_router<R, P>(service: Arc<RewardService<R, P>>) -> Router
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    Router::new()
        .route("/api/v1/rewards/calculate", post(calculate_handler::<R, P>))
        .route("/api/v1/rewards/finalize", post(finalize_handler::<R, P>))
        .route(
            "/api/v1/allocations/:pool_id",
            post(allocate_handler::<R, P>)
                .get(pool_status_handler::<R, P>)
                .delete(close_pool_handler::<R, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalculateRequest {
    pub(crate) submitter: UserId,
    pub(crate) attributes: SubmissionAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinalizeRequest {
    pub(crate) submitter: UserId,
    pub(crate) submission_id: SubmissionId,
    pub(crate) bundle: RewardBundle,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AllocateRequest {
    pub(crate) recipient_kind: RecipientKind,
    pub(crate) recipient_id: i64,
    pub(crate) units: u32,
}

pub(crate) async fn calculate_handler<R, P>(
    State(service): State<Arc<RewardService<R, P>>>,
    axum::Json(request): axum::Json<CalculateRequest>,
) -> Response
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    let ctx = SubmissionContext {
        submitter: request.submitter,
    };
    match service.calculate(&ctx, &request.attributes) {
        Ok(bundle) => (StatusCode::OK, axum::Json(bundle)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn finalize_handler<R, P>(
    State(service): State<Arc<RewardService<R, P>>>,
    axum::Json(request): axum::Json<FinalizeRequest>,
) -> Response
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    let ctx = SubmissionContext {
        submitter: request.submitter,
    };
    match service.finalize(&ctx, request.submission_id, &request.bundle) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn allocate_handler<R, P>(
    State(service): State<Arc<RewardService<R, P>>>,
    Path(pool_id): Path<String>,
    axum::Json(request): axum::Json<AllocateRequest>,
) -> Response
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    let pool_id = PoolId(pool_id);
    let recipient = match service.resolve_recipient(request.recipient_kind, request.recipient_id) {
        Ok(recipient) => recipient,
        Err(error) => return error_response(error),
    };

    match service.allocate(&pool_id, recipient, request.units) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pool_status_handler<R, P>(
    State(service): State<Arc<RewardService<R, P>>>,
    Path(pool_id): Path<String>,
) -> Response
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    match service.pool_status(&PoolId(pool_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_pool_handler<R, P>(
    State(service): State<Arc<RewardService<R, P>>>,
    Path(pool_id): Path<String>,
) -> Response
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    match service.close_pool(&PoolId(pool_id)) {
        Ok(snapshot) => {
            let payload = json!({
                "pool_id": snapshot.pool.pool_id,
                "status": snapshot.status.label(),
                "forfeited_units": snapshot.remaining,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: RewardServiceError) -> Response {
    let status = match &error {
        RewardServiceError::Invalid(_) | RewardServiceError::InvalidBundle(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RewardServiceError::Ledger(LedgerError::PoolNotFound(_)) => StatusCode::NOT_FOUND,
        RewardServiceError::Ledger(LedgerError::IneligibleRecipient { .. }) => {
            StatusCode::FORBIDDEN
        }
        RewardServiceError::Ledger(_) => StatusCode::CONFLICT,
        RewardServiceError::Repository(_) | RewardServiceError::Progress(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
