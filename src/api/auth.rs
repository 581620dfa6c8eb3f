use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, validation};
use crate::api::types::{AchievementDto, AlumniDto, CareerDto, TestimonialDto};
use crate::db::NewAlumni;
use crate::domain::Role;

pub const SESSION_USER_KEY: &str = "user";

/// Role snapshot stored in the session at login. The role is trusted for
/// the session's lifetime; role changes require a fresh login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub alumni_id: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumni_id: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub cohort_year: i32,
    pub faculty: String,
    pub study_program: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub home_city: String,
    pub home_province: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<AlumniDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<CareerDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<AchievementDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testimonials: Option<Vec<TestimonialDto>>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
///
/// Two disjoint credential paths: a student number issues an ALUMNI
/// session against the profile table; a password issues a staff session
/// against the accounts table. Every failure collapses into the same 401
/// so callers cannot probe which emails exist.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let email = payload.email.trim();

    let user = if let Some(student_number) = payload
        .student_number
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        login_alumni(&state, email, student_number.trim()).await?
    } else {
        let password = payload
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(ApiError::invalid_credentials)?;
        login_staff(&state, email, password).await?
    };

    session
        .insert(SESSION_USER_KEY, &user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(email = %user.email, role = %user.role, "Login succeeded");

    Ok(Json(ApiResponse::success(LoginResponse {
        email: user.email,
        name: user.name,
        role: user.role.as_str().to_string(),
        alumni_id: user.alumni_id,
    })))
}

async fn login_alumni(
    state: &AppState,
    email: &str,
    student_number: &str,
) -> Result<SessionUser, ApiError> {
    let profile = state
        .store()
        .get_alumni_by_email(email)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(ApiError::invalid_credentials)?;

    // Exact compare; the student number acts as the shared secret here.
    if profile.student_number != student_number {
        return Err(ApiError::invalid_credentials());
    }

    Ok(SessionUser {
        email: profile.email,
        name: profile.full_name,
        role: Role::Alumni,
        alumni_id: Some(profile.id),
    })
}

async fn login_staff(state: &AppState, email: &str, password: &str) -> Result<SessionUser, ApiError> {
    let account = state
        .store()
        .verify_account_password(email, password)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(ApiError::invalid_credentials)?;

    // Alumni must use the student-number path.
    if !account.role.is_staff() {
        return Err(ApiError::invalid_credentials());
    }

    Ok(SessionUser {
        email: account.email,
        name: account.name,
        role: account.role,
        alumni_id: account.alumni_id,
    })
}

/// POST /api/auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// POST /api/auth/register
///
/// Creates the alumni profile and its linked account in one transaction;
/// duplicates on student number or email are rejected up front.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AlumniDto>>, ApiError> {
    let email = validation::validate_email(&payload.email)?.to_string();
    let student_number = validation::validate_student_number(&payload.student_number)?.to_string();
    let full_name = validation::validate_name(&payload.full_name)?.to_string();
    let cohort_year = validation::validate_cohort_year(payload.cohort_year)?;
    let faculty = validation::validate_name(&payload.faculty)?.to_string();
    let study_program = validation::validate_name(&payload.study_program)?.to_string();
    let home_city = validation::validate_name(&payload.home_city)?.to_string();
    let home_province = validation::validate_name(&payload.home_province)?.to_string();

    let min_length = {
        let config = state.config().read().await;
        config.security.min_password_length
    };
    validation::validate_password(&payload.password, min_length)?;

    let store = state.store();

    if store
        .student_number_exists(&student_number)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
    {
        return Err(ApiError::Conflict(
            "Student number is already registered".to_string(),
        ));
    }
    if store
        .alumni_email_exists(&email)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        || store
            .account_email_exists(&email)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
    {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let input = NewAlumni {
        student_number,
        full_name,
        email,
        cohort_year,
        faculty,
        study_program,
        phone: payload.phone.filter(|p| !p.trim().is_empty()),
        home_city,
        home_province,
    };

    let security = {
        let config = state.config().read().await;
        config.security.clone()
    };

    let profile = store
        .register_alumni(&input, &payload.password, &security)
        .await
        .map_err(|e| {
            ApiError::from_write_error(e, "Email or student number is already registered")
        })?;

    tracing::info!(email = %profile.email, "Alumni registered");

    Ok(Json(ApiResponse::success(AlumniDto::from(profile))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = current_user(&session).await?;

    let mut response = MeResponse {
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.as_str().to_string(),
        profile: None,
        careers: None,
        achievements: None,
        testimonials: None,
    };

    if let Some(alumni_id) = user.alumni_id.as_deref() {
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

        response.profile = Some(AlumniDto::from(profile));
        response.careers = Some(careers.into_iter().map(CareerDto::from_model).collect());
        response.achievements = Some(
            achievements
                .into_iter()
                .map(AchievementDto::from_model)
                .collect(),
        );
        response.testimonials = Some(
            testimonials
                .into_iter()
                .map(TestimonialDto::from_model)
                .collect(),
        );
    }

    Ok(Json(ApiResponse::success(response)))
}

/// PUT /api/auth/password
///
/// Staff only: alumni authenticate with their student number and have no
/// stored password to rotate through this endpoint.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let user = current_user(&session).await?;
    require_staff(&user)?;

    let (min_length, security) = {
        let config = state.config().read().await;
        (config.security.min_password_length, config.security.clone())
    };
    validation::validate_password(&payload.new_password, min_length)?;

    if payload.current_password == payload.new_password {
        return Err(ApiError::validation(
            "New password must be different from current password",
        ));
    }

    let verified = state
        .store()
        .verify_account_password(&user.email, &payload.current_password)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if verified.is_none() {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    state
        .store()
        .update_account_password(&user.email, &payload.new_password, &security)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    tracing::info!(email = %user.email, "Password changed");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Re-derive the caller from the session; every protected handler starts
/// here before touching the store.
pub async fn current_user(session: &Session) -> Result<SessionUser, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

pub fn require_staff(user: &SessionUser) -> Result<(), ApiError> {
    if user.role.is_staff() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

pub fn require_admin(user: &SessionUser) -> Result<(), ApiError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// Resolve the caller's own alumni id, rejecting staff sessions.
pub fn require_alumni(user: &SessionUser) -> Result<&str, ApiError> {
    if user.role != Role::Alumni {
        return Err(ApiError::forbidden());
    }
    user.alumni_id
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Session has no linked profile".to_string()))
}
