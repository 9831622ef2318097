//! Daemon entry point: wires the Postgres-backed reader/store into the
//! forecast service and arms the daily scheduler. The HTTP/CLI layers live
//! in the surrounding application; this process only keeps the forecast
//! cycle running.

use std::sync::Arc;

use licewatch_infra::{
    ForecastScheduler, ForecastService, PostgresFarmDataReader, PostgresPredictionStore,
    SchedulerConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    licewatch_observability::init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::warn!("DATABASE_URL not set; using local dev default");
        "postgres://localhost/licewatch".to_string()
    });

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let reader = Arc::new(PostgresFarmDataReader::new(pool.clone()));
    let store = Arc::new(PostgresPredictionStore::new(pool));
    let service = Arc::new(ForecastService::new(reader, store));

    let scheduler = ForecastScheduler::new(SchedulerConfig::from_env());
    scheduler.start(Arc::clone(&service));

    tracing::info!("licewatch daemon running, ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    scheduler.stop();
    Ok(())
}
