use crate::{
    auth::AuthConfig,
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::credits::CreditSettings,
};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::infra::db::postgres::postgres_connection::PgPoolSquad;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let credit_settings = CreditSettings {
        daily_login_credits: config.credits.daily_login_credits,
        canonical_offset: config.credits.canonical_offset,
    };
    let boost_cost_credits = config.credits.boost_cost_credits;

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/ingestion/jobs",
            routers::ingestion_jobs::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/leaderboards",
            routers::leaderboards::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/credits",
            routers::credits::routes(Arc::clone(&db_pool), credit_settings),
        )
        .nest(
            "/api/v1/boosts",
            routers::promotions::boost_routes(Arc::clone(&db_pool), boost_cost_credits),
        )
        .nest(
            "/api/v1/badges",
            routers::promotions::badge_routes(Arc::clone(&db_pool), boost_cost_credits),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(Arc::new(AuthConfig {
            jwt_secret: config.supabase.jwt_secret.clone(),
        })))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
