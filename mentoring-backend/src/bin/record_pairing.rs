// src/bin/record_pairing.rs
//
// ペアリングを記録し、両参加者の有効期限を延長する
//   record-pairing <mentor_id> <learner_id> <ends_at (RFC 3339)>
use chrono::{DateTime, Utc};
use mentoring_backend::config::Config;
use mentoring_backend::db::{create_db_pool, run_migrations};
use mentoring_backend::service::pairing_service::PairingService;
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "Usage: record-pairing <mentor_id> <learner_id> <ends_at (RFC 3339)>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentoring_backend=info,record_pairing=info".into()),
        )
        .with(fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let mentor_id: i32 = args[1].parse()?;
    let learner_id: i32 = args[2].parse()?;
    let ends_at = DateTime::parse_from_rfc3339(&args[3])?.with_timezone(&Utc);

    let app_config = Config::from_env()?;
    let db_pool = create_db_pool(&app_config).await?;
    run_migrations(&db_pool).await?;

    let service = PairingService::from_app_config(db_pool, &app_config)?;
    let outcome = service.record_pairing(mentor_id, learner_id, ends_at).await?;

    println!("pair_id: {}", outcome.pairing.pair_id);
    println!("mentor {} expires: {}", outcome.mentor.id, outcome.mentor.expires);
    println!("learner {} expires: {}", outcome.learner.id, outcome.learner.expires);
    Ok(())
}
