use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::repositories::leaderboards::LeaderboardRepository,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::leaderboards::LeaderboardPostgres,
    },
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::leaderboards::LeaderboardUseCase,
};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let repository = LeaderboardPostgres::new(db_pool);
    router(Arc::new(LeaderboardUseCase::new(Arc::new(repository))))
}

pub fn router<L>(usecase: Arc<LeaderboardUseCase<L>>) -> Router
where
    L: LeaderboardRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/:slug", get(get_leaderboard::<L>))
        .with_state(usecase)
}

pub async fn get_leaderboard<L>(
    State(usecase): State<Arc<LeaderboardUseCase<L>>>,
    _: AuthUser,
    Path(slug): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError>
where
    L: LeaderboardRepository + Send + Sync,
{
    let page = usecase
        .get_leaderboard(&slug, query.page, query.limit)
        .await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axum_http::routers::test_support::{get, json_body, with_auth};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use crates::{
        domain::value_objects::leaderboards::RankedEntry, infra::memory::MemoryStore,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(store: &MemoryStore) -> Router {
        with_auth(router(Arc::new(LeaderboardUseCase::new(Arc::new(
            store.clone(),
        )))))
    }

    #[tokio::test]
    async fn serves_a_page_of_the_snapshot() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let entries = (0..5)
            .map(|i| RankedEntry {
                rank: i + 1,
                owner_id: Uuid::new_v4(),
                score: 100 - i64::from(i),
                achieved_at: now - Duration::minutes(i64::from(i)),
            })
            .collect();
        store
            .replace_snapshot("weekly-authors-overall".to_string(), now, entries)
            .await
            .unwrap();

        let response = app(&store)
            .oneshot(get("/weekly-authors-overall?page=2&limit=2", Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 5);
        assert_eq!(body["page"], 2);
        let rows = body["entries"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["rank"], 3);
        assert_eq!(rows[1]["score"], 96);
    }

    #[tokio::test]
    async fn never_computed_board_is_404() {
        let response = app(&MemoryStore::new())
            .oneshot(get("/monthly-authors-fiction", Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_slug_is_400() {
        let response = app(&MemoryStore::new())
            .oneshot(get("/yearly-authors-fiction", Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
