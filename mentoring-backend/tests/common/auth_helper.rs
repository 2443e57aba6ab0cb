// tests/common/auth_helper.rs
use axum::{
    body::Body,
    http::{header, Method, Request},
};
use mentoring_backend::domain::capability::Capability;
use mentoring_backend::domain::session_user::SessionUser;
use mentoring_backend::utils::jwt::JwtManager;
use serde_json::Value;
use std::collections::BTreeSet;

pub fn staff_user() -> SessionUser {
    SessionUser::new("staff@example.com", "Staff Member")
        .with_capabilities(BTreeSet::from([Capability::Staff]))
}

pub fn member_user() -> SessionUser {
    SessionUser::new("member@example.com", "Regular Member")
}

pub fn session_token(jwt_manager: &JwtManager, user: SessionUser) -> String {
    jwt_manager
        .generate_session_token(user)
        .expect("generate session token")
}

/// 任意の認証状態でリクエストを作成
pub fn create_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let method = Method::from_bytes(method.as_bytes()).unwrap();
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// セッションCookieでリクエストを作成
pub fn create_cookie_request(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}
