// src/domain/expiration.rs

use chrono::{DateTime, Duration, Utc};

/// 作成時刻 `now` に対する既定の有効期限を計算する
///
/// 表現可能な範囲を超える場合は `DateTime::<Utc>::MAX_UTC` で頭打ちになる。
pub fn compute_default_expiration(now: DateTime<Utc>, retention_window: Duration) -> DateTime<Utc> {
    now.checked_add_signed(retention_window)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// 参加者データの保持ポリシー
///
/// 参加者レコードは作成から `retention_window` 経過で失効する。
/// ペアリング中の参加者は、ペアリング終了時刻に `pairing_grace` を加えた時刻まで
/// 有効期限が延長される。延長によって有効期限が短くなることはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    retention_window: Duration,
    pairing_grace: Duration,
}

impl ExpirationPolicy {
    pub fn new(retention_window: Duration, pairing_grace: Duration) -> Self {
        Self {
            retention_window,
            pairing_grace,
        }
    }

    /// 保持期間と同じ長さの猶予を持つポリシー
    pub fn with_retention_days(days: i64) -> Self {
        Self::new(Duration::days(days), Duration::days(days))
    }

    pub fn retention_window(&self) -> Duration {
        self.retention_window
    }

    pub fn pairing_grace(&self) -> Duration {
        self.pairing_grace
    }

    pub fn default_expiration_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        compute_default_expiration(now, self.retention_window)
    }

    pub fn default_expiration(&self) -> DateTime<Utc> {
        self.default_expiration_at(Utc::now())
    }

/// ペアリング終了時刻に猶予を加えた時刻。範囲外なら `None`
    pub fn pairing_expiration(&self, pairing_ends_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        pairing_ends_at.checked_add_signed(self.pairing_grace)
    }

    /// ペアリング作成・更新時の有効期限
    pub fn extended_for_pairing(
        &self,
        current: DateTime<Utc>,
        pairing_ends_at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.pairing_expiration(pairing_ends_at)
            .map_or(DateTime::<Utc>::MAX_UTC, |until| current.max(until))
    }

    pub fn is_lapsed(&self, expires: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expires <= now
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::with_retention_days(180)
    }
}
