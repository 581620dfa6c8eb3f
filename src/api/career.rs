use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin, require_alumni};
use super::{ApiError, ApiResponse, AppState, validation};
use crate::api::types::{CareerDto, Paginated};
use crate::db::{CareerListQuery, NewCareer};
use crate::domain::CareerStatus;

#[derive(Deserialize)]
pub struct CreateCareerRequest {
    pub status: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub work_city: Option<String>,
    #[serde(default)]
    pub work_province: Option<String>,
    #[serde(default)]
    pub work_country: Option<String>,
    #[serde(default)]
    pub salary_band: Option<String>,
    #[serde(default)]
    pub field_related: Option<bool>,
    #[serde(default)]
    pub started_at: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminCareerQuery {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// GET /api/alumni/careers
pub async fn list_own(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<CareerDto>>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let careers = state
        .store()
        .careers_for_alumni(alumni_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        careers.into_iter().map(CareerDto::from_model).collect(),
    )))
}

/// POST /api/alumni/careers
///
/// Replaces the current career: the previous current record is demoted and
/// the new one inserted inside a single transaction, so a failure never
/// leaves the alumni with zero or two current careers.
pub async fn create(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateCareerRequest>,
) -> Result<Json<ApiResponse<CareerDto>>, ApiError> {
    let user = current_user(&session).await?;
    let alumni_id = require_alumni(&user)?;

    let status: CareerStatus = payload
        .status
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid career status: {}", payload.status)))?;

    let input = NewCareer {
        status,
        company: payload.company.filter(|s| !s.trim().is_empty()),
        position: payload.position.filter(|s| !s.trim().is_empty()),
        industry: payload.industry.filter(|s| !s.trim().is_empty()),
        work_city: payload.work_city.filter(|s| !s.trim().is_empty()),
        work_province: payload.work_province.filter(|s| !s.trim().is_empty()),
        work_country: payload.work_country.filter(|s| !s.trim().is_empty()),
        salary_band: payload.salary_band.filter(|s| !s.trim().is_empty()),
        field_related: payload.field_related,
        started_at: payload.started_at.filter(|s| !s.trim().is_empty()),
    };

    let created = state
        .store()
        .replace_current_career(alumni_id, &input)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    tracing::info!(alumni_id = %alumni_id, status = %status, "Current career replaced");

    Ok(Json(ApiResponse::success(CareerDto::from_model(created))))
}

/// GET /api/admin/careers
pub async fn admin_list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<AdminCareerQuery>,
) -> Result<Json<ApiResponse<Paginated<CareerDto>>>, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<CareerStatus>)
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let limit = validation::clamp_limit(query.limit);
    let list_query = CareerListQuery {
        limit,
        offset: query.offset.unwrap_or(0),
        status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let (rows, total) = state
        .store()
        .list_careers_with_alumni(&list_query)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let items = rows
        .into_iter()
        .map(|(career, alumni)| CareerDto::with_alumni(career, alumni.as_ref()))
        .collect();

    Ok(Json(ApiResponse::success(Paginated {
        items,
        total,
        limit,
        offset: list_query.offset,
    })))
}
