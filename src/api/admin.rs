use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin};
use super::{ApiError, ApiResponse, AppState, MessageResponse, validation};
use crate::api::types::{AlumniDto, AlumniListItemDto, Paginated};
use crate::db::AlumniListQuery;

#[derive(Deserialize)]
pub struct AdminAlumniQuery {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub study_program: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub verified: bool,
}

#[derive(Deserialize)]
pub struct BroadcastRequest {
    /// all | faculty | cohort | unverified
    pub target: String,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub cohort_year: Option<i32>,
    pub subject: String,
    pub body: String,
}

#[derive(Serialize)]
pub struct BroadcastResponse {
    pub recipients: usize,
}

#[derive(Serialize)]
pub struct AdminDashboard {
    pub total_alumni: u64,
    pub verified_alumni: u64,
    pub alumni_with_career: u64,
    pub alumni_with_achievements: u64,
    pub recent_alumni: Vec<AlumniListItemDto>,
}

/// GET /api/admin/alumni
pub async fn list_alumni(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<AdminAlumniQuery>,
) -> Result<Json<ApiResponse<Paginated<AlumniListItemDto>>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let limit = validation::clamp_limit(query.limit);
    let list_query = AlumniListQuery {
        limit,
        offset: query.offset.unwrap_or(0),
        verified: query.verified,
        search: query.search.filter(|s| !s.trim().is_empty()),
        faculty: query.faculty.filter(|s| !s.trim().is_empty()),
        study_program: query.study_program.filter(|s| !s.trim().is_empty()),
    };

    let (rows, total) = state
        .store()
        .list_alumni(&list_query)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(Paginated {
        items: rows.into_iter().map(AlumniListItemDto::from).collect(),
        total,
        limit,
        offset: list_query.offset,
    })))
}

/// GET /api/admin/alumni/{id}
pub async fn get_alumni(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AlumniDto>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let profile = state
        .store()
        .get_alumni(&id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::alumni_not_found(&id))?;

    Ok(Json(ApiResponse::success(AlumniDto::from(profile))))
}

/// DELETE /api/admin/alumni/{id}
///
/// Cascade delete: careers, achievements, testimonials and the linked
/// account go in the same transaction as the profile. A later fetch of
/// the id returns 404.
pub async fn delete_alumni(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let deleted = state
        .store()
        .delete_alumni(&id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::alumni_not_found(&id));
    }

    tracing::info!(alumni_id = %id, admin = %user.email, "Alumni deleted");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Alumni deleted".to_string(),
    })))
}

/// POST /api/admin/alumni/{id}/verify
///
/// Idempotent: setting the flag to its current value succeeds.
pub async fn verify_alumni(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<AlumniDto>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let profile = state
        .store()
        .set_alumni_verified(&id, payload.verified)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::alumni_not_found(&id))?;

    Ok(Json(ApiResponse::success(AlumniDto::from(profile))))
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AdminDashboard>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let store = state.store();

    let total_alumni = store
        .count_alumni()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let verified_alumni = store
        .count_verified_alumni()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let alumni_with_career = store
        .count_alumni_with_career()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let alumni_with_achievements = store
        .count_alumni_with_achievements()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let recent = store
        .recent_alumni(5)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(AdminDashboard {
        total_alumni,
        verified_alumni,
        alumni_with_career,
        alumni_with_achievements,
        recent_alumni: recent.into_iter().map(AlumniListItemDto::from).collect(),
    })))
}

/// POST /api/admin/broadcast
///
/// Resolves the recipient set and logs the send; there is deliberately no
/// mail-provider integration, so the response only reports the count.
pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<BroadcastResponse>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    validation::validate_content(&payload.subject, 200)?;
    validation::validate_content(&payload.body, 10_000)?;

    let (faculty, cohort_year, unverified_only) = match payload.target.as_str() {
        "all" => (None, None, false),
        "faculty" => {
            let faculty = payload
                .faculty
                .as_deref()
                .filter(|f| !f.trim().is_empty())
                .ok_or_else(|| ApiError::validation("Faculty target requires a faculty"))?;
            (Some(faculty), None, false)
        }
        "cohort" => {
            let year = payload
                .cohort_year
                .ok_or_else(|| ApiError::validation("Cohort target requires a cohort year"))?;
            (None, Some(validation::validate_cohort_year(year)?), false)
        }
        "unverified" => (None, None, true),
        other => {
            return Err(ApiError::validation(format!(
                "Invalid broadcast target: {}",
                other
            )));
        }
    };

    let recipients = state
        .store()
        .broadcast_recipients(faculty, cohort_year, unverified_only)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    tracing::info!(
        admin = %user.email,
        target = %payload.target,
        subject = %payload.subject,
        recipients = recipients.len(),
        "Broadcast resolved"
    );

    Ok(Json(ApiResponse::success(BroadcastResponse {
        recipients: recipients.len(),
    })))
}
