// src/api/handlers/enrollment_handler.rs
use crate::api::dto::enrollment_dto::EnrollmentRequest;
use crate::api::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

/// サインイン済みユーザーが自分自身を登録する
pub async fn enroll_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<EnrollmentRequest>,
) -> AppResult<impl IntoResponse> {
    let participant = app_state
        .participant_service
        .enroll(user.email(), payload)
        .await?;

    Ok((StatusCode::CREATED, Json(participant)))
}

pub fn enrollment_router(app_state: AppState) -> Router {
    Router::new()
        .route("/enrollment", post(enroll_handler))
        .with_state(app_state)
}
