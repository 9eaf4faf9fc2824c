use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::{config::config_model::Cron, services::cron_jobs::CronJobs};

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/cron/ingestion?limit=25" \
//     -H "Authorization: Bearer $CRON_QUEUE_TOKEN"
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/cron/promotions" \
//     -H "x-cron-secret: $CRON_SCHEDULER_SECRET"

#[derive(Clone)]
pub struct CronRouteState {
    credentials: Arc<Cron>,
    cron_jobs: Arc<CronJobs>,
}

pub fn routes(credentials: Cron, cron_jobs: Arc<CronJobs>) -> Router {
    Router::new()
        .route("/ingestion", post(run_ingestion))
        .route("/leaderboards", post(run_leaderboards))
        .route("/promotions", post(run_promotions))
        .with_state(CronRouteState {
            credentials: Arc::new(credentials),
            cron_jobs,
        })
}

#[derive(Debug, Deserialize)]
pub struct IngestionQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionSweepResponse {
    pub boosts_updated: usize,
    pub boosts_activated: usize,
    pub boosts_completed: usize,
    pub badges_expired: usize,
}

pub async fn run_ingestion(
    State(state): State<CronRouteState>,
    headers: HeaderMap,
    Query(query): Query<IngestionQuery>,
) -> Response {
    if let Err(rejection) = authorize(&headers, &state.credentials) {
        return rejection;
    }

    match state.cron_jobs.run_ingestion(query.limit).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            error!(error = ?err, "cron: ingestion run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "ingestion run failed").into_response()
        }
    }
}

pub async fn run_leaderboards(State(state): State<CronRouteState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&headers, &state.credentials) {
        return rejection;
    }

    let results = state.cron_jobs.run_leaderboards().await;
    Json(json!({ "results": results })).into_response()
}

pub async fn run_promotions(State(state): State<CronRouteState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&headers, &state.credentials) {
        return rejection;
    }

    match state.cron_jobs.run_promotions().await {
        Ok(result) => {
            let boosts = result.boosts.unwrap_or_default();
            Json(PromotionSweepResponse {
                boosts_updated: boosts.activated + boosts.completed,
                boosts_activated: boosts.activated,
                boosts_completed: boosts.completed,
                badges_expired: result.expired_badges.unwrap_or_default(),
            })
            .into_response()
        }
        Err(err) => {
            error!(error = ?err, "cron: promotion sweep failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "promotion sweep failed").into_response()
        }
    }
}

/// Accepts the queue bearer token or the scheduler header, whichever is configured.
fn authorize(headers: &HeaderMap, credentials: &Cron) -> Result<(), Response> {
    if credentials.queue_token.is_none() && credentials.scheduler_secret.is_none() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "cron credentials are not configured",
        )
            .into_response());
    }

    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let secret = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    let queue_ok = matches!((bearer, credentials.queue_token.as_deref()), (Some(got), Some(want)) if got == want);
    let scheduler_ok = matches!((secret, credentials.scheduler_secret.as_deref()), (Some(got), Some(want)) if got == want);

    if queue_ok || scheduler_ok {
        Ok(())
    } else {
        warn!("cron: rejected trigger with missing or invalid credentials");
        Err((StatusCode::UNAUTHORIZED, "unauthorized").into_response())
    }
}
