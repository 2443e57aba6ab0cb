use super::oidc::OidcConfig;
use super::security::SecurityConfig;
use crate::domain::capability::GroupCapabilityMap;
use crate::domain::expiration::ExpirationPolicy;
use chrono::Duration;
use std::env;
use std::str::FromStr;
use thiserror::Error;

pub(super) type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

const DEFAULT_DATA_RETENTION_DAYS: i64 = 180;
const MAX_RETENTION_DAYS: i64 = 36500;
const DEFAULT_SESSION_COOKIE_AGE_SECS: i64 = 14 * 24 * 60 * 60;
const MIN_SECRET_LENGTH: usize = 32;

/// 設定読み込みエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// セッショントークンの署名鍵
    pub secret_key: String,
    /// pair_id ハッシュ用の鍵（SECRET_KEY と同等に扱う）
    pub pair_id_hash_secret: String,
    /// ユーザーデータの保持日数
    pub data_retention_days: i64,
    /// ペアリング終了後も保持する日数
    pub pairing_grace_days: i64,
    pub retention_sweep_interval_secs: u64,
    pub allowed_hosts: Vec<String>,
    pub public_url: String,
    pub login_redirect_url: String,
    pub logout_redirect_url: String,
    pub session_cookie_age_secs: i64,
    pub group_capabilities: GroupCapabilityMap,
    pub oidc: OidcConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 環境変数から設定を読み込む（.env があれば先に読み込む）
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(&|key| env::var(key).ok())
    }

    /// 任意のキー/値ソースから設定を構築する
    pub fn from_source(lookup: &Lookup<'_>) -> Result<Self, ConfigError> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let is_development = environment == "development";
        let debug = match lookup("DEBUG") {
            Some(value) => parse_bool("DEBUG", &value)?,
            None => environment != "production",
        };

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_number(lookup, "PORT", 5000)?;

        let data_retention_days = parse_number(lookup, "DATA_RETENTION_DAYS", DEFAULT_DATA_RETENTION_DAYS)?;
        if !(1..=MAX_RETENTION_DAYS).contains(&data_retention_days) {
            return Err(ConfigError::Invalid {
                key: "DATA_RETENTION_DAYS",
                reason: format!("must be between 1 and {}", MAX_RETENTION_DAYS),
            });
        }
        let pairing_grace_days = parse_number(lookup, "PAIRING_GRACE_DAYS", data_retention_days)?;
        if !(0..=MAX_RETENTION_DAYS).contains(&pairing_grace_days) {
            return Err(ConfigError::Invalid {
                key: "PAIRING_GRACE_DAYS",
                reason: format!("must be between 0 and {}", MAX_RETENTION_DAYS),
            });
        }

        let session_cookie_age_secs =
            parse_number(lookup, "SESSION_COOKIE_AGE_SECS", DEFAULT_SESSION_COOKIE_AGE_SECS)?;
        if session_cookie_age_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_COOKIE_AGE_SECS",
                reason: "must be positive".to_string(),
            });
        }

        let staff_groups = split_list(
            &lookup("STAFF_GROUPS").unwrap_or_else(|| "mozilliansorg_mentoring-committee".to_string()),
        );
        let group_capabilities = GroupCapabilityMap::from_staff_groups(staff_groups.as_slice())
            .map_err(|e| ConfigError::Invalid {
                key: "STAFF_GROUPS",
                reason: e.to_string(),
            })?;

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://mentoring.sqlite3?mode=rwc".to_string()),
            secret_key: required_secret(lookup, "SECRET_KEY")?,
            pair_id_hash_secret: required_secret(lookup, "PAIR_ID_HASH_SECRET")?,
            data_retention_days,
            pairing_grace_days,
            retention_sweep_interval_secs: parse_number(lookup, "RETENTION_SWEEP_INTERVAL_SECS", 3600)?,
            allowed_hosts: split_list(
                &lookup("ALLOWED_HOSTS").unwrap_or_else(|| "mentoring.ngrok.io".to_string()),
            ),
            public_url: lookup("PUBLIC_URL").unwrap_or_else(|| format!("http://{}:{}", host, port)),
            login_redirect_url: lookup("LOGIN_REDIRECT_URL").unwrap_or_else(|| "/".to_string()),
            logout_redirect_url: lookup("LOGOUT_REDIRECT_URL").unwrap_or_else(|| "/".to_string()),
            session_cookie_age_secs,
            group_capabilities,
            oidc: OidcConfig::from_source(lookup)?,
            security: SecurityConfig::from_source(lookup, is_development, debug)?,
            environment,
            debug,
            host,
            port,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// OIDC コールバックの絶対URL
    pub fn oidc_callback_url(&self) -> String {
        format!("{}/oidc/callback/", self.public_url.trim_end_matches('/'))
    }

    pub fn expiration_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::new(
            Duration::days(self.data_retention_days),
            Duration::days(self.pairing_grace_days),
        )
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            debug: true,
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "sqlite::memory:".to_string(),
            secret_key: "test-secret-key-that-is-at-least-32-characters-long".to_string(),
            pair_id_hash_secret: "test-pair-id-secret-that-is-at-least-32-chars".to_string(),
            data_retention_days: DEFAULT_DATA_RETENTION_DAYS,
            pairing_grace_days: DEFAULT_DATA_RETENTION_DAYS,
            retention_sweep_interval_secs: 0,
            allowed_hosts: vec!["*".to_string()],
            public_url: "http://localhost:5000".to_string(),
            login_redirect_url: "/".to_string(),
            logout_redirect_url: "/".to_string(),
            session_cookie_age_secs: DEFAULT_SESSION_COOKIE_AGE_SECS,
            group_capabilities: GroupCapabilityMap::default_staff(),
            oidc: OidcConfig::for_testing("http://127.0.0.1:9"),
            security: SecurityConfig::for_testing(),
        }
    }
}

fn required_secret(lookup: &Lookup<'_>, key: &'static str) -> Result<String, ConfigError> {
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    if value.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("must be at least {} characters", MIN_SECRET_LENGTH),
        });
    }
    Ok(value)
}

pub(super) fn parse_number<T: FromStr>(
    lookup: &Lookup<'_>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("'{}' is not a number", value),
        }),
        None => Ok(default),
    }
}

pub(super) fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
