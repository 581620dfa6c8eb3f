use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_user, require_staff};
use super::{ApiError, ApiResponse, AppState};
use crate::api::types::GroupCountDto;
use crate::db::AnalyticsFilter;
use crate::domain::CareerStatus;

const TOP_GROUP_LIMIT: usize = 10;

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub cohort: Option<i32>,
}

#[derive(Serialize)]
pub struct AnalyticsSummary {
    pub total_alumni: u64,
    pub with_current_career: i64,
    /// Share of current careers reporting EMPLOYED or SELF_EMPLOYED.
    pub employment_rate: f64,
    /// Share of field-reporting careers that match the field of study.
    pub field_match_rate: f64,
    pub status_counts: Vec<GroupCountDto>,
}

#[derive(Serialize)]
pub struct AnalyticsFilters {
    pub faculties: Vec<String>,
    pub cohorts: Vec<i32>,
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub by_faculty: Vec<GroupCountDto>,
    pub by_cohort: Vec<GroupCountDto>,
    pub by_industry: Vec<GroupCountDto>,
    pub by_province: Vec<GroupCountDto>,
    pub by_salary_band: Vec<GroupCountDto>,
    pub filters: AnalyticsFilters,
}

#[derive(Serialize)]
pub struct ProvinceDistribution {
    pub province: String,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub cities: Vec<GroupCountDto>,
}

/// GET /api/analytics?faculty=&cohort=
///
/// Read-only aggregates, recomputed per call; an optional faculty/cohort
/// filter scopes every grouping to the matching alumni.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<AnalyticsResponse>>, ApiError> {
    let user = current_user(&session).await?;
    require_staff(&user)?;

    let filter = AnalyticsFilter {
        faculty: query.faculty.filter(|f| !f.trim().is_empty()),
        cohort_year: query.cohort,
    };

    let store = state.store();

    let ids = store
        .filtered_alumni_ids(&filter)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let ids_ref = ids.as_deref();

    let total_alumni = store
        .analytics_alumni_count(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let status_counts = store
        .careers_by_status(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let with_current_career: i64 = status_counts.iter().map(|(_, c)| c).sum();
    let absorbed: i64 = status_counts
        .iter()
        .filter(|(status, _)| {
            status
                .parse::<CareerStatus>()
                .is_ok_and(CareerStatus::counts_as_absorbed)
        })
        .map(|(_, c)| c)
        .sum();

    let employment_rate = rate(absorbed, with_current_career);

    let field_match = store
        .career_field_match(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let field_total: i64 = field_match.iter().map(|(_, c)| c).sum();
    let field_related: i64 = field_match
        .iter()
        .filter(|(related, _)| *related)
        .map(|(_, c)| c)
        .sum();
    let field_match_rate = rate(field_related, field_total);

    let by_faculty = store
        .alumni_by_faculty(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let by_cohort = store
        .alumni_by_cohort(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let by_industry = store
        .careers_by_industry(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let by_province = store
        .alumni_by_province(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let by_salary_band = store
        .careers_by_salary_band(ids_ref)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let faculties = store
        .distinct_faculties()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    let cohorts = store
        .distinct_cohorts()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(AnalyticsResponse {
        summary: AnalyticsSummary {
            total_alumni,
            with_current_career,
            employment_rate,
            field_match_rate,
            status_counts: to_group_counts(status_counts),
        },
        by_faculty: to_group_counts(by_faculty),
        by_cohort: by_cohort
            .into_iter()
            .map(|(year, count)| GroupCountDto {
                label: year.to_string(),
                count,
            })
            .collect(),
        by_industry: to_group_counts(by_industry)
            .into_iter()
            .take(TOP_GROUP_LIMIT)
            .collect(),
        by_province: to_group_counts(by_province)
            .into_iter()
            .take(TOP_GROUP_LIMIT)
            .collect(),
        by_salary_band: to_group_counts(by_salary_band),
        filters: AnalyticsFilters { faculties, cohorts },
    })))
}

/// GET /api/analytics/distribution
///
/// Per-province counts with a city breakdown and fixed map coordinates.
pub async fn distribution(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<ProvinceDistribution>>>, ApiError> {
    let user = current_user(&session).await?;
    require_staff(&user)?;

    let rows = state
        .store()
        .province_city_counts()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let mut provinces: BTreeMap<String, Vec<GroupCountDto>> = BTreeMap::new();
    for (province, city, count) in rows {
        provinces
            .entry(province)
            .or_default()
            .push(GroupCountDto { label: city, count });
    }

    let mut result: Vec<ProvinceDistribution> = provinces
        .into_iter()
        .map(|(province, mut cities)| {
            cities.sort_by(|a, b| b.count.cmp(&a.count));
            let count = cities.iter().map(|c| c.count).sum();
            let coords = province_coordinates(&province);
            ProvinceDistribution {
                province,
                count,
                latitude: coords.map(|(lat, _)| lat),
                longitude: coords.map(|(_, lng)| lng),
                cities,
            }
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(Json(ApiResponse::success(result)))
}

fn rate(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn to_group_counts(rows: Vec<(String, i64)>) -> Vec<GroupCountDto> {
    rows.into_iter()
        .map(|(label, count)| GroupCountDto { label, count })
        .collect()
}

/// Approximate centroids for the provinces the portal sees most; the map
/// renders unknown provinces without a marker.
fn province_coordinates(province: &str) -> Option<(f64, f64)> {
    let normalized = province.trim().to_lowercase();
    let coords = match normalized.as_str() {
        "dki jakarta" | "jakarta" => (-6.2088, 106.8456),
        "jawa barat" => (-6.9039, 107.6186),
        "jawa tengah" => (-7.1510, 110.1403),
        "di yogyakarta" | "yogyakarta" => (-7.7956, 110.3695),
        "jawa timur" => (-7.5361, 112.2384),
        "banten" => (-6.4058, 106.0640),
        "bali" => (-8.3405, 115.0920),
        "sumatera utara" => (2.1154, 99.5451),
        "sumatera barat" => (-0.7399, 100.8000),
        "sumatera selatan" => (-3.3194, 103.9144),
        "riau" => (0.2933, 101.7068),
        "kepulauan riau" => (3.9457, 108.1429),
        "lampung" => (-4.5586, 105.4068),
        "kalimantan barat" => (-0.2788, 111.4753),
        "kalimantan timur" => (0.5387, 116.4194),
        "kalimantan selatan" => (-3.0926, 115.2838),
        "sulawesi selatan" => (-3.6688, 119.9741),
        "sulawesi utara" => (0.6247, 123.9750),
        "nusa tenggara barat" => (-8.6529, 117.3616),
        "nusa tenggara timur" => (-8.6574, 121.0794),
        "papua" => (-4.2699, 138.0804),
        "maluku" => (-3.2385, 130.1453),
        "aceh" => (4.6951, 96.7494),
        _ => return None,
    };
    Some(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_handles_zero_denominator() {
        assert_eq!(rate(3, 0), 0.0);
        assert!((rate(1, 4) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn province_lookup_is_case_insensitive() {
        assert!(province_coordinates("DKI Jakarta").is_some());
        assert!(province_coordinates("jawa barat").is_some());
        assert!(province_coordinates("Atlantis").is_none());
    }
}
