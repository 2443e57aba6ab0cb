// src/middleware/security_headers.rs

use crate::config::{AppConfig, SecurityConfig};
use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

// DEBUG 時は ALLOWED_HOSTS に関係なく許可するホスト
const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// ホスト検証・HTTPS リダイレクト・セキュリティヘッダーの設定
#[derive(Clone)]
pub struct SecurityState {
    pub config: Arc<SecurityConfig>,
    pub allowed_hosts: Arc<Vec<String>>,
    pub debug: bool,
}

impl SecurityState {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            config: Arc::new(config.security.clone()),
            allowed_hosts: Arc::new(config.allowed_hosts.clone()),
            debug: config.debug,
        }
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();

        if self.debug && LOCAL_HOSTS.contains(&host.as_str()) {
            return true;
        }

        self.allowed_hosts.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            if allowed == "*" {
                return true;
            }
            // ".example.com" はサブドメインを含めて一致
            match allowed.strip_prefix('.') {
                Some(domain) => host == domain || host.ends_with(&allowed),
                None => host == allowed,
            }
        })
    }

    /// プロキシヘッダーから HTTPS リクエストかを判定
    pub fn is_secure(&self, headers: &HeaderMap) -> bool {
        let (name, expected) = &self.config.proxy_ssl_header;
        headers
            .get(name.as_str())
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case(expected))
    }
}

/// Host ヘッダーを ALLOWED_HOSTS と照合
pub async fn allowed_hosts_middleware(
    State(state): State<SecurityState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();

    if !state.is_allowed_host(&host) {
        warn!(host = %host, path = %request.uri().path(), "Rejected request for disallowed host");
        return Err(AppError::BadRequest("Invalid Host header".to_string()));
    }

    Ok(next.run(request).await)
}

/// HTTP でのアクセスを HTTPS に 301 リダイレクト
pub async fn ssl_redirect_middleware(
    State(state): State<SecurityState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.ssl_redirect || state.is_secure(request.headers()) {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    let location = format!("https://{}{}", host, path_and_query);

    match HeaderValue::from_str(&location) {
        Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response(),
        Err(_) => AppError::BadRequest("Invalid Host header".to_string()).into_response(),
    }
}

/// セキュリティヘッダーミドルウェア
pub async fn security_headers_middleware(
    State(state): State<SecurityState>,
    request: Request,
    next: Next,
) -> Response {
    let secure = state.is_secure(request.headers());
    let mut response = next.run(request).await;
    let config = &state.config;
    let headers = response.headers_mut();

    if config.content_type_nosniff {
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
    }
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    if let Ok(value) = HeaderValue::from_str(&config.referrer_policy) {
        headers.insert(header::REFERRER_POLICY, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.csp.header_value()) {
        headers.insert(header::CONTENT_SECURITY_POLICY, value);
    }

    if secure && config.hsts_seconds > 0 {
        if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", config.hsts_seconds)) {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
        }
    }

    response
}

fn strip_port(host: &str) -> &str {
    // IPv6 リテラルは "[::1]:5000" の形式
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}
