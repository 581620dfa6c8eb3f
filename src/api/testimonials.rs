use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin, require_alumni};
use super::{ApiError, ApiResponse, AppState, MessageResponse, validation};
use crate::api::types::TestimonialDto;
use crate::domain::TestimonialStatus;

#[derive(Deserialize)]
pub struct CreateTestimonialRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct ModerateTestimonialRequest {
    pub status: String,
}

/// GET /api/testimonials
///
/// Public: only approved testimonials, with the author's name attached.
pub async fn list_approved(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TestimonialDto>>>, ApiError> {
    let rows = state
        .store()
        .approved_testimonials()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        rows.into_iter()
            .map(|(t, alumni)| TestimonialDto::with_alumni(t, alumni.as_ref()))
            .collect(),
    )))
}

/// POST /api/testimonials
///
/// New submissions always land PENDING; moderation decides visibility.
pub async fn create(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateTestimonialRequest>,
) -> Result<Json<ApiResponse<TestimonialDto>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let content = validation::validate_content(&payload.content, 2000)?;

    let created = state
        .store()
        .create_testimonial(alumni_id, content)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(TestimonialDto::from_model(
        created,
    ))))
}

/// GET /api/admin/testimonials
pub async fn admin_list(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<TestimonialDto>>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let rows = state
        .store()
        .list_testimonials_with_alumni()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        rows.into_iter()
            .map(|(t, alumni)| TestimonialDto::with_alumni(t, alumni.as_ref()))
            .collect(),
    )))
}

/// PATCH /api/admin/testimonials/{id}
///
/// Moderation can only land on a terminal state; a testimonial cannot be
/// reset to PENDING.
pub async fn admin_moderate(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<ModerateTestimonialRequest>,
) -> Result<Json<ApiResponse<TestimonialDto>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let status: TestimonialStatus = payload
        .status
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid status: {}", payload.status)))?;

    if status == TestimonialStatus::Pending {
        return Err(ApiError::validation(
            "Status must be APPROVED or REJECTED",
        ));
    }

    let updated = state
        .store()
        .set_testimonial_status(&id, status)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Testimonial", &id))?;

    Ok(Json(ApiResponse::success(TestimonialDto::from_model(
        updated,
    ))))
}

/// DELETE /api/admin/testimonials/{id}
pub async fn admin_delete(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let deleted = state
        .store()
        .delete_testimonial(&id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::not_found("Testimonial", &id));
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Testimonial deleted".to_string(),
    })))
}
