// src/api/mod.rs
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{
    session_middleware, AuthMiddlewareConfig, OIDC_FLOW_COOKIE_NAME, SESSION_COOKIE_NAME,
};
use crate::middleware::security_headers::{
    allowed_hosts_middleware, security_headers_middleware, ssl_redirect_middleware,
    SecurityState,
};
use crate::service::{
    oidc_service::OidcService, participant_service::ParticipantService,
    retention_service::RetentionService,
};
use crate::utils::jwt::{JwtConfig, JwtManager};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod handlers;

use handlers::{
    enrollment_handler::enrollment_router, oidc_handler::oidc_router,
    participant_handler::participant_router, system_handler::system_router,
};

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub participant_service: Arc<ParticipantService>,
    pub retention_service: Arc<RetentionService>,
    pub oidc_service: Arc<OidcService>,
    pub jwt_manager: Arc<JwtManager>,
    pub cookie_config: CookieConfig,
    pub config: Arc<AppConfig>,
}

/// Cookie設定
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub session_cookie_name: String,
    pub flow_cookie_name: String,
    pub secure: bool,
    pub path: String,
    pub session_max_age_secs: i64,
    pub flow_max_age_secs: i64,
}

impl CookieConfig {
    pub fn from_app_config(app_config: &AppConfig, jwt_manager: &JwtManager) -> Self {
        Self {
            session_cookie_name: SESSION_COOKIE_NAME.to_string(),
            flow_cookie_name: OIDC_FLOW_COOKIE_NAME.to_string(),
            secure: app_config.security.cookie_secure,
            path: "/".to_string(),
            session_max_age_secs: jwt_manager.session_expiry_seconds(),
            flow_max_age_secs: jwt_manager.flow_expiry_seconds(),
        }
    }
}

impl AppState {
    pub fn new(db_pool: DatabaseConnection, app_config: &AppConfig) -> AppResult<Self> {
        let policy = app_config.expiration_policy();

        let jwt_manager = JwtManager::new(JwtConfig::from_app_config(app_config))
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            participant_service: Arc::new(ParticipantService::new(db_pool.clone(), policy)),
            retention_service: Arc::new(RetentionService::new(db_pool, policy)),
            oidc_service: Arc::new(OidcService::new(app_config)?),
            cookie_config: CookieConfig::from_app_config(app_config, &jwt_manager),
            jwt_manager: Arc::new(jwt_manager),
            config: Arc::new(app_config.clone()),
        })
    }
}

/// アプリケーション全体のルーター
pub fn app_router(app_state: AppState) -> Router {
    let auth_config = AuthMiddlewareConfig::new(app_state.jwt_manager.clone());
    let security = SecurityState::from_app_config(&app_state.config);

    Router::new()
        .merge(participant_router(app_state.clone()))
        .merge(enrollment_router(app_state.clone()))
        .merge(oidc_router(app_state))
        .merge(system_router())
        // 下に書いたものほど外側で実行される
        .layer(from_fn(logging_middleware))
        .layer(from_fn_with_state(auth_config, session_middleware))
        .layer(from_fn(inject_request_context))
        .layer(from_fn_with_state(security.clone(), security_headers_middleware))
        .layer(from_fn_with_state(security.clone(), ssl_redirect_middleware))
        .layer(from_fn_with_state(security, allowed_hosts_middleware))
        .layer(TraceLayer::new_for_http())
}
