use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::credit_ledger::CreditLedgerRepository,
        value_objects::credits::CreditTransactionDto,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::credit_ledger::CreditLedgerPostgres,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::credits::{CreditSettings, CreditUseCase},
};

#[derive(Debug, Deserialize)]
pub struct CreditsQuery {
    pub action: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreditsAction {
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub page: i64,
    pub limit: i64,
    pub transactions: Vec<CreditTransactionDto>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, settings: CreditSettings) -> Router {
    let repository = CreditLedgerPostgres::new(db_pool);
    router(Arc::new(CreditUseCase::new(Arc::new(repository), settings)))
}

pub fn router<C>(usecase: Arc<CreditUseCase<C>>) -> Router
where
    C: CreditLedgerRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(read_credits::<C>).post(credit_action::<C>))
        .with_state(usecase)
}

/// Balance by default, ledger history with `?action=history`.
pub async fn read_credits<C>(
    State(usecase): State<Arc<CreditUseCase<C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<CreditsQuery>,
) -> Result<axum::response::Response, AppError>
where
    C: CreditLedgerRepository + Send + Sync,
{
    match query.action.as_deref() {
        None | Some("balance") => {
            let balance = usecase.get_balance(user_id).await?;
            Ok(Json(BalanceResponse { balance }).into_response())
        }
        Some("history") => {
            let (page, transactions) = usecase
                .get_history(user_id, query.page, query.limit)
                .await?;
            Ok(Json(HistoryResponse {
                page: page.page,
                limit: page.limit,
                transactions,
            })
            .into_response())
        }
        Some(other) => Err(AppError::BadRequest(format!("unknown action: {other}"))),
    }
}

pub async fn credit_action<C>(
    State(usecase): State<Arc<CreditUseCase<C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(body): Json<CreditsAction>,
) -> Result<impl IntoResponse, AppError>
where
    C: CreditLedgerRepository + Send + Sync,
{
    match body.action.as_str() {
        "daily_login" => {
            let award = usecase.award_daily_login(user_id).await?;
            Ok(Json(award))
        }
        other => Err(AppError::BadRequest(format!("unknown action: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axum_http::routers::test_support::{get, json_body, post_json, with_auth};
    use axum::http::StatusCode;
    use chrono::FixedOffset;
    use crates::infra::memory::MemoryStore;
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(store: &MemoryStore) -> Router {
        let settings = CreditSettings {
            daily_login_credits: 10,
            canonical_offset: FixedOffset::east_opt(0).unwrap(),
        };
        with_auth(router(Arc::new(CreditUseCase::new(
            Arc::new(store.clone()),
            settings,
        ))))
    }

    #[tokio::test]
    async fn daily_login_is_awarded_once_per_day() {
        let store = MemoryStore::new();
        let owner_id = Uuid::new_v4();

        let first = app(&store)
            .oneshot(post_json("/", owner_id, json!({"action": "daily_login"})))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(json_body(first).await, json!({"awarded": 10, "balance": 10}));

        let second = app(&store)
            .oneshot(post_json("/", owner_id, json!({"action": "daily_login"})))
            .await
            .unwrap();
        assert_eq!(json_body(second).await, json!({"awarded": 0, "balance": 10}));

        let balance = app(&store).oneshot(get("/", owner_id)).await.unwrap();
        assert_eq!(json_body(balance).await, json!({"balance": 10}));
    }

    #[tokio::test]
    async fn history_lists_ledger_entries() {
        let store = MemoryStore::new();
        let owner_id = Uuid::new_v4();

        app(&store)
            .oneshot(post_json("/", owner_id, json!({"action": "daily_login"})))
            .await
            .unwrap();

        let response = app(&store)
            .oneshot(get("/?action=history&page=1&limit=500", owner_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["limit"], 100);
        assert_eq!(body["transactions"][0]["delta"], 10);
        assert_eq!(body["transactions"][0]["reason"], "daily_login");
    }

    #[tokio::test]
    async fn unknown_action_is_400() {
        let response = app(&MemoryStore::new())
            .oneshot(post_json("/", Uuid::new_v4(), json!({"action": "steal"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
