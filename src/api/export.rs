use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_admin};
use super::{ApiError, AppState};
use crate::db::{AlumniListQuery, AnalyticsFilter, CareerListQuery};
use crate::domain::CareerStatus;

/// UTF-8 byte order mark so spreadsheet tools pick the right encoding.
const BOM: &str = "\u{feff}";
const EXPORT_FETCH_LIMIT: u64 = 100_000;

#[derive(Deserialize)]
pub struct ExportQuery {
    /// alumni | careers | locations | accreditation
    #[serde(rename = "type", default)]
    pub export_type: Option<String>,
    #[serde(default)]
    pub cohort: Option<i32>,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// GET /api/admin/export
pub async fn export(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let user = current_user(&session).await?;
    require_admin(&user)?;

    let export_type = query.export_type.as_deref().unwrap_or("alumni");

    let (name, csv) = match export_type {
        "alumni" => ("alumni", export_alumni(&state, &query).await?),
        "careers" => ("careers", export_careers(&state).await?),
        "locations" => ("locations", export_locations(&state).await?),
        "accreditation" => ("accreditation", export_accreditation(&state).await?),
        other => {
            return Err(ApiError::validation(format!(
                "Invalid export type: {}",
                other
            )));
        }
    };

    let filename = format!(
        "{}-export-{}.csv",
        name,
        chrono::Utc::now().format("%Y-%m-%d")
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .map_err(|e| ApiError::internal(format!("Bad export filename: {e}")))?,
    );

    Ok((headers, csv).into_response())
}

async fn export_alumni(state: &AppState, query: &ExportQuery) -> Result<String, ApiError> {
    let list_query = AlumniListQuery {
        limit: EXPORT_FETCH_LIMIT,
        offset: 0,
        verified: query.verified,
        search: None,
        faculty: query.faculty.clone().filter(|f| !f.trim().is_empty()),
        study_program: None,
    };

    let (rows, _) = state
        .store()
        .list_alumni(&list_query)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let mut out = String::from(BOM);
    write_row(
        &mut out,
        &[
            "student_number",
            "full_name",
            "email",
            "cohort_year",
            "faculty",
            "study_program",
            "home_city",
            "home_province",
            "verified",
            "career_status",
            "company",
            "position",
        ],
    );

    for (profile, career) in rows {
        if let Some(cohort) = query.cohort {
            if profile.cohort_year != cohort {
                continue;
            }
        }
        let cohort_year = profile.cohort_year.to_string();
        let verified = if profile.is_verified { "yes" } else { "no" };
        let (status, company, position) = career.map_or_else(
            || (String::new(), String::new(), String::new()),
            |c| {
                (
                    c.status,
                    c.company.unwrap_or_default(),
                    c.position.unwrap_or_default(),
                )
            },
        );
        write_row(
            &mut out,
            &[
                &profile.student_number,
                &profile.full_name,
                &profile.email,
                &cohort_year,
                &profile.faculty,
                &profile.study_program,
                &profile.home_city,
                &profile.home_province,
                verified,
                &status,
                &company,
                &position,
            ],
        );
    }

    Ok(out)
}

async fn export_careers(state: &AppState) -> Result<String, ApiError> {
    let (rows, _) = state
        .store()
        .list_careers_with_alumni(&CareerListQuery {
            limit: EXPORT_FETCH_LIMIT,
            offset: 0,
            status: None,
            search: None,
        })
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let mut out = String::from(BOM);
    write_row(
        &mut out,
        &[
            "student_number",
            "full_name",
            "status",
            "company",
            "position",
            "industry",
            "work_city",
            "work_province",
            "work_country",
            "salary_band",
            "field_related",
            "is_current",
        ],
    );

    for (career, alumni) in rows {
        let (student_number, full_name) = alumni.map_or_else(
            || (String::new(), String::new()),
            |a| (a.student_number, a.full_name),
        );
        let field_related = career
            .field_related
            .map_or("", |r| if r { "yes" } else { "no" });
        let is_current = if career.is_current { "yes" } else { "no" };
        write_row(
            &mut out,
            &[
                &student_number,
                &full_name,
                &career.status,
                career.company.as_deref().unwrap_or(""),
                career.position.as_deref().unwrap_or(""),
                career.industry.as_deref().unwrap_or(""),
                career.work_city.as_deref().unwrap_or(""),
                career.work_province.as_deref().unwrap_or(""),
                &career.work_country,
                career.salary_band.as_deref().unwrap_or(""),
                field_related,
                is_current,
            ],
        );
    }

    Ok(out)
}

async fn export_locations(state: &AppState) -> Result<String, ApiError> {
    let rows = state
        .store()
        .province_city_counts()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let mut out = String::from(BOM);
    write_row(&mut out, &["province", "city", "alumni_count"]);
    for (province, city, count) in rows {
        write_row(&mut out, &[&province, &city, &count.to_string()]);
    }
    Ok(out)
}

/// Per-faculty absorption summary in the shape accreditation reports ask
/// for: totals, verified share and the employed/self-employed rate.
async fn export_accreditation(state: &AppState) -> Result<String, ApiError> {
    let store = state.store();

    let faculties = store
        .distinct_faculties()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let mut out = String::from(BOM);
    write_row(
        &mut out,
        &[
            "faculty",
            "total_alumni",
            "with_current_career",
            "absorbed",
            "employment_rate",
        ],
    );

    for faculty in faculties {
        let filter = AnalyticsFilter {
            faculty: Some(faculty.clone()),
            cohort_year: None,
        };
        let ids = store
            .filtered_alumni_ids(&filter)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let ids_ref = ids.as_deref();

        let total = store
            .analytics_alumni_count(ids_ref)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let status_counts = store
            .careers_by_status(ids_ref)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let with_career: i64 = status_counts.iter().map(|(_, c)| c).sum();
        let absorbed: i64 = status_counts
            .iter()
            .filter(|(status, _)| {
                status
                    .parse::<CareerStatus>()
                    .is_ok_and(CareerStatus::counts_as_absorbed)
            })
            .map(|(_, c)| c)
            .sum();
        let employment_rate = if with_career == 0 {
            0.0
        } else {
            absorbed as f64 / with_career as f64
        };

        write_row(
            &mut out,
            &[
                &faculty,
                &total.to_string(),
                &with_career.to_string(),
                &absorbed.to_string(),
                &format!("{:.4}", employment_rate),
            ],
        );
    }

    Ok(out)
}

/// Append one CRLF-terminated row of escaped fields.
fn write_row(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}

/// Collapse embedded newlines to spaces, then quote fields containing a
/// comma, quote or leading/trailing space.
fn escape_field(field: &str) -> String {
    let flattened: String = field
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    let needs_quoting = flattened.contains(',')
        || flattened.contains('"')
        || flattened.starts_with(' ')
        || flattened.ends_with(' ');

    if needs_quoting {
        format!("\"{}\"", flattened.replace('"', "\"\""))
    } else {
        flattened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape_field("Informatika"), "Informatika");
        assert_eq!(escape_field("2021"), "2021");
    }

    #[test]
    fn commas_and_quotes_are_quoted() {
        assert_eq!(escape_field("Acme, Inc"), "\"Acme, Inc\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn newlines_collapse_to_spaces() {
        assert_eq!(escape_field("line1\nline2"), "line1 line2");
        assert_eq!(escape_field("a\r\nb"), "a  b");
    }

    #[test]
    fn rows_end_with_crlf() {
        let mut out = String::new();
        write_row(&mut out, &["a", "b,c"]);
        assert_eq!(out, "a,\"b,c\"\r\n");
    }

    #[test]
    fn bom_prefix() {
        assert_eq!(BOM.as_bytes(), [0xEF, 0xBB, 0xBF]);
    }
}
