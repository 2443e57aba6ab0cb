// src/middleware/auth.rs

use crate::domain::session_user::SessionUser;
use crate::error::AppError;
use crate::logging::RequestContext;
use crate::utils::jwt::JwtManager;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

pub const SESSION_COOKIE_NAME: &str = "mentoring_session";
pub const OIDC_FLOW_COOKIE_NAME: &str = "mentoring_oidc_flow";

/// セッションミドルウェアの設定
#[derive(Clone)]
pub struct AuthMiddlewareConfig {
    pub jwt_manager: Arc<JwtManager>,
    pub session_cookie_name: String,
}

impl AuthMiddlewareConfig {
    pub fn new(jwt_manager: Arc<JwtManager>) -> Self {
        Self {
            jwt_manager,
            session_cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }
}

/// 認証済みユーザー情報を格納するエクステンション
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: SessionUser,
}

impl AuthenticatedUser {
    pub fn new(user: SessionUser) -> Self {
        Self { user }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn is_staff(&self) -> bool {
        self.user.is_staff()
    }

    pub fn ensure_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Staff access required".to_string()))
        }
    }
}

/// セッションを復元するミドルウェア
///
/// トークンが無い・無効な場合は匿名として処理を続ける。拒否はガード側で行う。
pub async fn session_middleware(
    State(config): State<AuthMiddlewareConfig>,
    cookie_jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers(), &cookie_jar, &config.session_cookie_name)
    {
        match config.jwt_manager.verify_session_token(&token) {
            Ok(claims) => {
                if let Some(context) = request.extensions_mut().get_mut::<RequestContext>() {
                    context.user_email = Some(claims.user.email.clone());
                }
                request
                    .extensions_mut()
                    .insert(AuthenticatedUser::new(claims.user));
            }
            Err(e) => {
                debug!(
                    path = %request.uri().path(),
                    error = %e,
                    "Ignoring invalid session token"
                );
            }
        }
    }

    next.run(request).await
}

/// staff 権限を要求するガード
pub async fn require_staff(request: Request, next: Next) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| {
            warn!(path = %path, "Missing authentication");
            AppError::Unauthorized("Authentication required".to_string())
        })?;

    if let Err(e) = user.ensure_staff() {
        warn!(
            path = %path,
            user_email = %user.email(),
            "Access denied: staff permission required"
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// リクエストからトークンを抽出
fn extract_token(headers: &HeaderMap, cookie_jar: &CookieJar, cookie_name: &str) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer ").map(|s| s.to_string()));

    let cookie_token = cookie_jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string());

    auth_header.or(cookie_token)
}
