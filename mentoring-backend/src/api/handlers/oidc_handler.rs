// src/api/handlers/oidc_handler.rs
use crate::api::dto::oidc_dto::CallbackQuery;
use crate::api::{AppState, CookieConfig};
use crate::error::{AppError, AppResult};
use crate::service::oidc_service::generate_random_token;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

const STATE_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 32;

/// 認可エンドポイントへリダイレクトする
pub async fn authenticate_handler(State(app_state): State<AppState>) -> AppResult<Response> {
    let state = generate_random_token(STATE_LENGTH);
    let nonce = generate_random_token(NONCE_LENGTH);

    let flow_token = app_state
        .jwt_manager
        .generate_flow_token(&state, &nonce)
        .map_err(|e| AppError::InternalServerError(format!("Failed to start login: {}", e)))?;

    let location = app_state.oidc_service.authorization_url(&state, &nonce);
    let jar = CookieJar::new().add(flow_cookie(&app_state.cookie_config, flow_token));

    Ok((jar, found(&location)?).into_response())
}

/// 認可コードを検証してセッションを開始する
pub async fn callback_handler(
    State(app_state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    cookie_jar: CookieJar,
) -> AppResult<Response> {
    let cookie_config = &app_state.cookie_config;

    if let Some(error) = &query.error {
        warn!(
            error = %error,
            description = ?query.error_description,
            "Identity provider returned an error"
        );
        return Err(AppError::Unauthorized(
            "Authentication was not completed".to_string(),
        ));
    }

    let flow_token = cookie_jar
        .get(&cookie_config.flow_cookie_name)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::BadRequest("Missing login state".to_string()))?;
    let flow = app_state
        .jwt_manager
        .verify_flow_token(&flow_token)
        .map_err(|e| {
            warn!(error = %e, "Invalid login state cookie");
            AppError::BadRequest("Invalid login state".to_string())
        })?;

    if query.state.as_deref() != Some(flow.state.as_str()) {
        warn!("OIDC state mismatch");
        return Err(AppError::BadRequest("Login state mismatch".to_string()));
    }
    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let user = app_state.oidc_service.authenticate(code, &flow.nonce).await?;
    let session_token = app_state
        .jwt_manager
        .generate_session_token(user.clone())
        .map_err(|e| AppError::InternalServerError(format!("Failed to create session: {}", e)))?;

    info!(email = %user.email, is_staff = user.is_staff(), "User signed in");

    let jar = cookie_jar
        .add(expired_cookie(cookie_config, &cookie_config.flow_cookie_name))
        .add(session_cookie(cookie_config, session_token));

    Ok((jar, found(&app_state.config.login_redirect_url)?).into_response())
}

/// セッションを破棄する
pub async fn logout_handler(
    State(app_state): State<AppState>,
    cookie_jar: CookieJar,
) -> AppResult<Response> {
    let cookie_config = &app_state.cookie_config;
    let jar = cookie_jar.add(expired_cookie(
        cookie_config,
        &cookie_config.session_cookie_name,
    ));

    Ok((jar, found(&app_state.config.logout_redirect_url)?).into_response())
}

pub fn oidc_router(app_state: AppState) -> Router {
    Router::new()
        .route("/oidc/authenticate/", get(authenticate_handler))
        .route("/oidc/callback/", get(callback_handler))
        .route("/oidc/logout/", get(logout_handler).post(logout_handler))
        .with_state(app_state)
}

// --- ヘルパー関数 ---

fn found(location: &str) -> AppResult<Response> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| AppError::InternalServerError(format!("Invalid redirect URL: {}", location)))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn session_cookie(config: &CookieConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), token))
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_max_age_secs))
        .build()
}

// IdP からのリダイレクトで送信されるよう Lax にする
fn flow_cookie(config: &CookieConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.flow_cookie_name.clone(), token))
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.flow_max_age_secs))
        .build()
}

fn expired_cookie(config: &CookieConfig, name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .build()
}
