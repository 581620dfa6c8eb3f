use serde::Serialize;

use crate::db::CareerBrief;
use crate::entities::{achievements, alumni_profiles, careers, testimonials};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AlumniDto {
    pub id: String,
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub cohort_year: i32,
    pub faculty: String,
    pub study_program: String,
    pub phone: Option<String>,
    pub home_city: String,
    pub home_province: String,
    pub home_country: String,
    pub linkedin_url: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_visibility: String,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<alumni_profiles::Model> for AlumniDto {
    fn from(m: alumni_profiles::Model) -> Self {
        Self {
            id: m.id,
            student_number: m.student_number,
            full_name: m.full_name,
            email: m.email,
            cohort_year: m.cohort_year,
            faculty: m.faculty,
            study_program: m.study_program,
            phone: m.phone,
            home_city: m.home_city,
            home_province: m.home_province,
            home_country: m.home_country,
            linkedin_url: m.linkedin_url,
            avatar_url: m.avatar_url,
            profile_visibility: m.profile_visibility,
            is_verified: m.is_verified,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Current-career summary shown on listing rows.
#[derive(Debug, Serialize)]
pub struct CareerBriefDto {
    pub status: String,
    pub company: Option<String>,
    pub position: Option<String>,
}

impl From<CareerBrief> for CareerBriefDto {
    fn from(b: CareerBrief) -> Self {
        Self {
            status: b.status,
            company: b.company,
            position: b.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlumniListItemDto {
    pub id: String,
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub cohort_year: i32,
    pub faculty: String,
    pub study_program: String,
    pub is_verified: bool,
    pub created_at: String,
    pub current_career: Option<CareerBriefDto>,
}

impl From<(alumni_profiles::Model, Option<CareerBrief>)> for AlumniListItemDto {
    fn from((m, career): (alumni_profiles::Model, Option<CareerBrief>)) -> Self {
        Self {
            id: m.id,
            student_number: m.student_number,
            full_name: m.full_name,
            email: m.email,
            cohort_year: m.cohort_year,
            faculty: m.faculty,
            study_program: m.study_program,
            is_verified: m.is_verified,
            created_at: m.created_at,
            current_career: career.map(CareerBriefDto::from),
        }
    }
}

/// Directory entry for the alumni network; contact fields are limited to
/// what a fellow alumni may see.
#[derive(Debug, Serialize)]
pub struct NetworkEntryDto {
    pub id: String,
    pub full_name: String,
    pub cohort_year: i32,
    pub faculty: String,
    pub study_program: String,
    pub home_city: String,
    pub home_province: String,
    pub linkedin_url: Option<String>,
    pub avatar_url: Option<String>,
    pub current_career: Option<CareerBriefDto>,
}

impl From<(alumni_profiles::Model, Option<CareerBrief>)> for NetworkEntryDto {
    fn from((m, career): (alumni_profiles::Model, Option<CareerBrief>)) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            cohort_year: m.cohort_year,
            faculty: m.faculty,
            study_program: m.study_program,
            home_city: m.home_city,
            home_province: m.home_province,
            linkedin_url: m.linkedin_url,
            avatar_url: m.avatar_url,
            current_career: career.map(CareerBriefDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CareerDto {
    pub id: String,
    pub alumni_id: String,
    pub status: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub industry: Option<String>,
    pub work_city: Option<String>,
    pub work_province: Option<String>,
    pub work_country: String,
    pub salary_band: Option<String>,
    pub field_related: Option<bool>,
    pub started_at: Option<String>,
    pub is_current: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumni_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
}

impl CareerDto {
    #[must_use]
    pub fn from_model(m: careers::Model) -> Self {
        Self {
            id: m.id,
            alumni_id: m.alumni_id,
            status: m.status,
            company: m.company,
            position: m.position,
            industry: m.industry,
            work_city: m.work_city,
            work_province: m.work_province,
            work_country: m.work_country,
            salary_band: m.salary_band,
            field_related: m.field_related,
            started_at: m.started_at,
            is_current: m.is_current,
            created_at: m.created_at,
            alumni_name: None,
            student_number: None,
        }
    }

    #[must_use]
    pub fn with_alumni(m: careers::Model, alumni: Option<&alumni_profiles::Model>) -> Self {
        let mut dto = Self::from_model(m);
        if let Some(a) = alumni {
            dto.alumni_name = Some(a.full_name.clone());
            dto.student_number = Some(a.student_number.clone());
        }
        dto
    }
}

#[derive(Debug, Serialize)]
pub struct AchievementDto {
    pub id: String,
    pub alumni_id: String,
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumni_name: Option<String>,
}

impl AchievementDto {
    #[must_use]
    pub fn from_model(m: achievements::Model) -> Self {
        Self {
            id: m.id,
            alumni_id: m.alumni_id,
            title: m.title,
            description: m.description,
            year: m.year,
            created_at: m.created_at,
            alumni_name: None,
        }
    }

    #[must_use]
    pub fn with_alumni(m: achievements::Model, alumni: Option<&alumni_profiles::Model>) -> Self {
        let mut dto = Self::from_model(m);
        dto.alumni_name = alumni.map(|a| a.full_name.clone());
        dto
    }
}

#[derive(Debug, Serialize)]
pub struct TestimonialDto {
    pub id: String,
    pub alumni_id: String,
    pub content: String,
    pub status: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumni_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohort_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_program: Option<String>,
}

impl TestimonialDto {
    #[must_use]
    pub fn from_model(m: testimonials::Model) -> Self {
        Self {
            id: m.id,
            alumni_id: m.alumni_id,
            content: m.content,
            status: m.status,
            created_at: m.created_at,
            alumni_name: None,
            cohort_year: None,
            study_program: None,
        }
    }

    #[must_use]
    pub fn with_alumni(m: testimonials::Model, alumni: Option<&alumni_profiles::Model>) -> Self {
        let mut dto = Self::from_model(m);
        if let Some(a) = alumni {
            dto.alumni_name = Some(a.full_name.clone());
            dto.cohort_year = Some(a.cohort_year);
            dto.study_program = Some(a.study_program.clone());
        }
        dto
    }
}

#[derive(Debug, Serialize)]
pub struct GroupCountDto {
    pub label: String,
    pub count: i64,
}
