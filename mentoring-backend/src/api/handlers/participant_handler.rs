// src/api/handlers/participant_handler.rs
use crate::api::dto::participant_dto::{ByEmailQuery, ParticipantResponse};
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_staff;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    middleware::from_fn,
    routing::get,
    Json, Router,
};

// 整数IDのパス抽出器
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid path parameter".to_string()))?;

        raw.parse::<i32>()
            .map(IdPath)
            .map_err(|_| AppError::ValidationError(format!("Invalid participant id: '{}'", raw)))
    }
}

pub async fn list_participants_handler(
    State(app_state): State<AppState>,
) -> AppResult<Json<Vec<ParticipantResponse>>> {
    let participants = app_state.participant_service.list_participants().await?;
    Ok(Json(participants))
}

pub async fn get_participant_handler(
    State(app_state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ParticipantResponse>> {
    let participant = app_state.participant_service.get_participant(id).await?;
    Ok(Json(participant))
}

pub async fn get_participant_by_email_handler(
    State(app_state): State<AppState>,
    Query(query): Query<ByEmailQuery>,
) -> AppResult<Json<ParticipantResponse>> {
    let participant = app_state
        .participant_service
        .get_participant_by_email(&query.email)
        .await?;
    Ok(Json(participant))
}

/// 参加者API（staff のみ・読み取り専用）
///
/// ガードはメソッドごとの route_layer に掛けるため、未対応メソッドは
/// 認証状態に関係なく 405 になる。
pub fn participant_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/participants",
            get(list_participants_handler).route_layer(from_fn(require_staff)),
        )
        .route(
            "/api/participants/by_email",
            get(get_participant_by_email_handler).route_layer(from_fn(require_staff)),
        )
        .route(
            "/api/participants/{id}",
            get(get_participant_handler).route_layer(from_fn(require_staff)),
        )
        .with_state(app_state)
}
