use anyhow::Result;
use crates::domain::repositories::{
    cron_audit::CronAuditRepository,
    ingestion_jobs::IngestionJobRepository,
    leaderboards::{LeaderboardRepository, LeaderboardScoreSource},
    platform_sync::PlatformSync,
    promotions::PromotionRepository,
};
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{
            cron_audit::CronAuditPostgres, ingestion_jobs::IngestionJobPostgres,
            leaderboards::LeaderboardPostgres, promotions::PromotionPostgres,
            score_events::ScoreEventsPostgres,
        },
    },
    platform_sync::connector::{ConnectorConfig, ConnectorPlatformSync},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config,
    services::{cron_jobs::CronJobs, scheduler_loop},
    usecases::{
        cron_runs::CronRunRecorder,
        ingestion_batch::{IngestionBatchSettings, IngestionBatchUseCase},
        leaderboard_recompute::LeaderboardRecomputeUseCase,
        promotion_sweep::PromotionSweepUseCase,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.pool_size,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let job_repository: Arc<dyn IngestionJobRepository + Send + Sync> =
        Arc::new(IngestionJobPostgres::new(Arc::clone(&db_pool_arc)));
    let cron_audit_repository: Arc<dyn CronAuditRepository + Send + Sync> =
        Arc::new(CronAuditPostgres::new(Arc::clone(&db_pool_arc)));
    let leaderboard_repository: Arc<dyn LeaderboardRepository + Send + Sync> =
        Arc::new(LeaderboardPostgres::new(Arc::clone(&db_pool_arc)));
    let score_source: Arc<dyn LeaderboardScoreSource + Send + Sync> =
        Arc::new(ScoreEventsPostgres::new(Arc::clone(&db_pool_arc)));
    let promotion_repository: Arc<dyn PromotionRepository + Send + Sync> =
        Arc::new(PromotionPostgres::new(Arc::clone(&db_pool_arc)));

    let ingestion = &dotenvy_env.ingestion;
    let job_timeout = Duration::from_secs(ingestion.job_timeout_secs);

    let connector = &dotenvy_env.platform_connector;
    let platform_sync: Arc<dyn PlatformSync + Send + Sync> =
        Arc::new(ConnectorPlatformSync::new(ConnectorConfig {
            base_url: connector.base_url.clone(),
            token: connector.token.clone(),
            request_timeout: job_timeout,
        })?);

    let cron_jobs = Arc::new(CronJobs::new(
        CronRunRecorder::new(cron_audit_repository),
        IngestionBatchUseCase::new(
            job_repository,
            platform_sync,
            IngestionBatchSettings {
                job_timeout,
                stale_after: chrono::Duration::minutes(ingestion.stale_after_minutes),
            },
        ),
        LeaderboardRecomputeUseCase::new(
            score_source,
            leaderboard_repository,
            dotenvy_env.leaderboards.canonical_offset,
        ),
        PromotionSweepUseCase::new(promotion_repository),
        ingestion.batch_limit,
        dotenvy_env.leaderboards.slugs.clone(),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let server_cron_jobs = Arc::clone(&cron_jobs);
    let cron_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, server_cron_jobs).await });

    let scheduler = &dotenvy_env.scheduler;
    if scheduler.enabled {
        let interval = Duration::from_secs(scheduler.interval_secs);
        let scheduler_task = tokio::spawn(scheduler_loop::run(Arc::clone(&cron_jobs), interval));

        tokio::select! {
            result = cron_server => result??,
            result = scheduler_task => result??,
        };
    } else {
        info!("Internal scheduler disabled; waiting for external cron triggers");
        cron_server.await??;
    }

    Ok(())
}
