// src/bin/retention_sweep.rs
//
// 期限切れの参加者データを一度だけ削除する（cron などから実行）
use chrono::Utc;
use mentoring_backend::config::Config;
use mentoring_backend::db::{create_db_pool, run_migrations};
use mentoring_backend::service::retention_service::RetentionService;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentoring_backend=info,retention_sweep=info".into()),
        )
        .with(fmt::layer())
        .init();

    let app_config = Config::from_env()?;
    let db_pool = create_db_pool(&app_config).await?;
    run_migrations(&db_pool).await?;

    let service = RetentionService::new(db_pool, app_config.expiration_policy());
    let deleted = service.sweep(Utc::now()).await?;

    tracing::info!(
        deleted,
        retention_days = app_config.data_retention_days,
        "Retention sweep finished"
    );
    Ok(())
}
