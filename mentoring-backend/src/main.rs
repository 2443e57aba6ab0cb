// src/main.rs
use mentoring_backend::api::{app_router, AppState};
use mentoring_backend::config::Config;
use mentoring_backend::db::{create_db_pool, run_migrations};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // トレーシングの設定
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentoring_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting mentoring backend...");

    // 設定を読み込む
    let app_config = Config::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        debug = app_config.debug,
        data_retention_days = app_config.data_retention_days,
        pairing_grace_days = app_config.pairing_grace_days,
        "Configuration loaded"
    );

    // データベース接続とマイグレーション
    let db_pool = create_db_pool(&app_config).await?;
    run_migrations(&db_pool).await?;
    tracing::info!("Database pool created and migrations applied.");

    let app_state = AppState::new(db_pool, &app_config)?;

    if app_config.retention_sweep_interval_secs > 0 {
        app_state
            .retention_service
            .clone()
            .spawn_periodic(Duration::from_secs(app_config.retention_sweep_interval_secs));
        tracing::info!(
            interval_secs = app_config.retention_sweep_interval_secs,
            "Retention sweep scheduled"
        );
    } else {
        tracing::warn!("Retention sweep disabled");
    }

    let app = app_router(app_state);

    tracing::info!("Router configured. Server listening on {}", app_config.server_addr());

    let listener = TcpListener::bind(app_config.server_addr()).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
