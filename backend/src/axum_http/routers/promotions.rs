use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::{credit_ledger::CreditLedgerRepository, promotions::PromotionRepository},
        value_objects::promotions::PurchaseBoostModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{credit_ledger::CreditLedgerPostgres, promotions::PromotionPostgres},
    },
};
use std::sync::Arc;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError,
    usecases::promotions::PromotionUseCase,
};

type PostgresPromotionUseCase = PromotionUseCase<PromotionPostgres, CreditLedgerPostgres>;

fn postgres_usecase(db_pool: Arc<PgPoolSquad>, boost_cost_credits: i64) -> PostgresPromotionUseCase {
    PromotionUseCase::new(
        Arc::new(PromotionPostgres::new(Arc::clone(&db_pool))),
        Arc::new(CreditLedgerPostgres::new(db_pool)),
        boost_cost_credits,
    )
}

pub fn boost_routes(db_pool: Arc<PgPoolSquad>, boost_cost_credits: i64) -> Router {
    boost_router(Arc::new(postgres_usecase(db_pool, boost_cost_credits)))
}

pub fn badge_routes(db_pool: Arc<PgPoolSquad>, boost_cost_credits: i64) -> Router {
    badge_router(Arc::new(postgres_usecase(db_pool, boost_cost_credits)))
}

pub fn boost_router<P, C>(usecase: Arc<PromotionUseCase<P, C>>) -> Router
where
    P: PromotionRepository + Send + Sync + 'static,
    C: CreditLedgerRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_boosts::<P, C>).post(purchase_boost::<P, C>))
        .with_state(usecase)
}

pub fn badge_router<P, C>(usecase: Arc<PromotionUseCase<P, C>>) -> Router
where
    P: PromotionRepository + Send + Sync + 'static,
    C: CreditLedgerRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_active_badges::<P, C>))
        .with_state(usecase)
}

pub async fn purchase_boost<P, C>(
    State(usecase): State<Arc<PromotionUseCase<P, C>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<PurchaseBoostModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: PromotionRepository + Send + Sync,
    C: CreditLedgerRepository + Send + Sync,
{
    let boost = usecase.purchase_boost(user_id, model).await?;
    Ok((StatusCode::CREATED, Json(boost)))
}

pub async fn list_boosts<P, C>(
    State(usecase): State<Arc<PromotionUseCase<P, C>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PromotionRepository + Send + Sync,
    C: CreditLedgerRepository + Send + Sync,
{
    Ok(Json(usecase.list_boosts(user_id).await?))
}

pub async fn list_active_badges<P, C>(
    State(usecase): State<Arc<PromotionUseCase<P, C>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: PromotionRepository + Send + Sync,
    C: CreditLedgerRepository + Send + Sync,
{
    Ok(Json(usecase.list_active_badges(user_id).await?))
}
