use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::ingestion_jobs::IngestionJobRepository,
        value_objects::ingestion_jobs::EnqueueJobModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::ingestion_jobs::IngestionJobPostgres,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::ingestion_jobs::IngestionJobUseCase,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub status: &'static str,
    pub job_id: Uuid,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let repository = IngestionJobPostgres::new(db_pool);
    router(Arc::new(IngestionJobUseCase::new(Arc::new(repository))))
}

pub fn router<R>(usecase: Arc<IngestionJobUseCase<R>>) -> Router
where
    R: IngestionJobRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(enqueue::<R>).get(list_jobs::<R>))
        .route("/:job_id", get(get_status::<R>))
        .with_state(usecase)
}

pub async fn enqueue<R>(
    State(usecase): State<Arc<IngestionJobUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<EnqueueJobModel>,
) -> Result<impl IntoResponse, AppError>
where
    R: IngestionJobRepository + Send + Sync,
{
    let job_id = usecase.enqueue(user_id, model).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            status: "queued",
            job_id,
            message: "Sync job queued",
        }),
    ))
}

pub async fn get_status<R>(
    State(usecase): State<Arc<IngestionJobUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    R: IngestionJobRepository + Send + Sync,
{
    let view = usecase.get_status(job_id, user_id).await?;
    Ok(Json(view))
}

pub async fn list_jobs<R>(
    State(usecase): State<Arc<IngestionJobUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<ListJobsQuery>,
) -> Result<impl IntoResponse, AppError>
where
    R: IngestionJobRepository + Send + Sync,
{
    let jobs = usecase.list_jobs(user_id, query.limit).await?;
    Ok(Json(jobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axum_http::routers::test_support::{get, json_body, post_json, with_auth};
    use axum::{body::Body, http::Request};
    use crates::infra::memory::MemoryStore;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(store: &MemoryStore) -> Router {
        with_auth(router(Arc::new(IngestionJobUseCase::new(Arc::new(
            store.clone(),
        )))))
    }

    #[tokio::test]
    async fn enqueue_returns_202_and_job_resolves_as_queued() {
        let store = MemoryStore::new();
        let owner_id = Uuid::new_v4();

        let response = app(&store)
            .oneshot(post_json(
                "/",
                owner_id,
                json!({"platform": "gumroad", "payload": {"productId": "p1"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = json_body(response).await;
        assert_eq!(body["status"], "queued");
        assert_eq!(body["message"], "Sync job queued");

        let job_id = body["jobId"].as_str().unwrap().to_string();
        let response = app(&store)
            .oneshot(get(&format!("/{job_id}"), owner_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], job_id.as_str());
        assert_eq!(body["platform"], "gumroad");
        assert_eq!(body["status"], "queued");
        assert!(body["executedAt"].is_null());
        assert!(body["errorMessage"].is_null());
    }

    #[tokio::test]
    async fn status_of_someone_elses_job_is_403() {
        let store = MemoryStore::new();
        let owner_id = Uuid::new_v4();

        let response = app(&store)
            .oneshot(post_json("/", owner_id, json!({"platform": "whop"})))
            .await
            .unwrap();
        let job_id = json_body(response).await["jobId"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app(&store)
            .oneshot(get(&format!("/{job_id}"), Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_job_is_404() {
        let store = MemoryStore::new();

        let response = app(&store)
            .oneshot(get(&format!("/{}", Uuid::new_v4()), Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], 404);
    }

    #[tokio::test]
    async fn unknown_platform_is_400() {
        let store = MemoryStore::new();

        let response = app(&store)
            .oneshot(post_json("/", Uuid::new_v4(), json!({"platform": "myspace"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.jobs().is_empty());
    }

    #[tokio::test]
    async fn missing_token_is_401_and_nothing_is_written() {
        let store = MemoryStore::new();

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(json!({"platform": "gumroad"}).to_string()))
            .unwrap();
        let response = app(&store).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.jobs().is_empty());
    }

    #[tokio::test]
    async fn list_returns_only_own_jobs() {
        let store = MemoryStore::new();
        let owner_id = Uuid::new_v4();

        for platform in ["gumroad", "kobo"] {
            app(&store)
                .oneshot(post_json("/", owner_id, json!({"platform": platform})))
                .await
                .unwrap();
        }
        app(&store)
            .oneshot(post_json("/", Uuid::new_v4(), json!({"platform": "whop"})))
            .await
            .unwrap();

        let response = app(&store).oneshot(get("/", owner_id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let jobs = body.as_array().unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|job| job["platform"] != "whop"));
    }
}
