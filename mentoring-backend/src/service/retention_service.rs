// src/service/retention_service.rs

use crate::db::DbPool;
use crate::domain::expiration::ExpirationPolicy;
use crate::error::AppResult;
use crate::repository::participant_repository::ParticipantRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// 期限切れ参加者データの削除
pub struct RetentionService {
    repo: ParticipantRepository,
}

impl RetentionService {
    pub fn new(db_pool: DbPool, policy: ExpirationPolicy) -> Self {
        Self {
            repo: ParticipantRepository::new(db_pool, policy),
        }
    }

    /// 削除した件数を返す
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let deleted = self.repo.delete_lapsed(now).await?;
        if deleted > 0 {
            let remaining = self.repo.count().await?;
            info!(deleted, remaining, now = %now, "Removed lapsed participant records");
        }
        Ok(deleted)
    }

    /// 一定間隔で sweep を実行するタスクを起動する
    pub fn spawn_periodic(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep(Utc::now()).await {
                    error!(error = %e, "Retention sweep failed");
                }
            }
        })
    }
}
