use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin, require_alumni};
use super::{ApiError, ApiResponse, AppState, MessageResponse, validation};
use crate::api::types::AchievementDto;
use crate::db::NewAchievement;

#[derive(Deserialize)]
pub struct CreateAchievementRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub year: i32,
}

/// GET /api/alumni/achievements
pub async fn list_own(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<AchievementDto>>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let achievements = state
        .store()
        .achievements_for_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        achievements
            .into_iter()
            .map(AchievementDto::from_model)
            .collect(),
    )))
}

/// POST /api/alumni/achievements
pub async fn create(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateAchievementRequest>,
) -> Result<Json<ApiResponse<AchievementDto>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let title = validation::validate_content(&payload.title, 200)?.to_string();
    let year = validation::validate_achievement_year(payload.year)?;

    let input = NewAchievement {
        title,
        description: payload.description.filter(|d| !d.trim().is_empty()),
        year,
    };

    let created = state
        .store()
        .create_achievement(alumni_id, &input)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(AchievementDto::from_model(
        created,
    ))))
}

/// GET /api/admin/achievements
pub async fn admin_list(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<AchievementDto>>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let rows = state
        .store()
        .list_achievements_with_alumni()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        rows.into_iter()
            .map(|(a, alumni)| AchievementDto::with_alumni(a, alumni.as_ref()))
            .collect(),
    )))
}

/// DELETE /api/admin/achievements/{id}
pub async fn admin_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let deleted = state
        .store()
        .delete_achievement(&id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::not_found("Achievement", &id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Achievement deleted".to_string(),
    })))
}
