use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_alumni};
use super::{ApiError, ApiResponse, AppState, validation};
use crate::api::types::{AlumniDto, NetworkEntryDto};
use crate::db::ProfileUpdate;
use crate::domain::ProfileVisibility;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    pub home_city: String,
    pub home_province: String,
    pub profile_visibility: String,
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub careers: usize,
    pub achievements: usize,
    pub testimonials: usize,
    pub is_verified: bool,
    pub profile_visibility: String,
}

/// GET /api/alumni/me
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AlumniDto>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let profile = state
        .store()
        .get_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::alumni_not_found(alumni_id))?;

    Ok(Json(ApiResponse::success(AlumniDto::from(profile))))
}

/// PUT /api/alumni/me
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<AlumniDto>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let full_name = validation::validate_name(&payload.full_name)?.to_string();
    let home_city = validation::validate_name(&payload.home_city)?.to_string();
    let home_province = validation::validate_name(&payload.home_province)?.to_string();
    let visibility: ProfileVisibility = payload
        .profile_visibility
        .parse()
        .map_err(|_| {
            ApiError::validation(format!(
                "Invalid profile visibility: {}",
                payload.profile_visibility
            ))
        })?;

    let update = ProfileUpdate {
        full_name,
        phone: payload.phone.filter(|p| !p.trim().is_empty()),
        linkedin_url: payload.linkedin_url.filter(|u| !u.trim().is_empty()),
        home_city,
        home_province,
        profile_visibility: visibility,
    };

    let profile = state
        .store()
        .update_alumni_profile(alumni_id, &update)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::alumni_not_found(alumni_id))?;

    Ok(Json(ApiResponse::success(AlumniDto::from(profile))))
}

/// GET /api/alumni/network
///
/// Directory for logged-in alumni; profiles set to PRIVATE never appear.
pub async fn network(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<NetworkEntryDto>>>, ApiError> {
    let user = current_user(&session).await?;
    require_alumni(&user)?;

    let entries = state
        .store()
        .alumni_network()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        entries.into_iter().map(NetworkEntryDto::from).collect(),
    )))
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let store = state.store();

    let profile = store
        .get_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::alumni_not_found(alumni_id))?;

    let careers = store
        .careers_for_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let achievements = store
        .achievements_for_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let testimonials = store
        .testimonials_for_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(DashboardStats {
        careers: careers.len(),
        achievements: achievements.len(),
        testimonials: testimonials.len(),
        is_verified: profile.is_verified,
        profile_visibility: profile.profile_visibility,
    })))
}
