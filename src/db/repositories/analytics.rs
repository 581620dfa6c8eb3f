use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::entities::{alumni_profiles, careers};

/// Optional scoping for the analytics views; both fields empty means
/// portal-wide numbers.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsFilter {
    pub faculty: Option<String>,
    pub cohort_year: Option<i32>,
}

impl AnalyticsFilter {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.faculty.is_none() && self.cohort_year.is_none()
    }
}

pub struct AnalyticsRepository {
    conn: DatabaseConnection,
}

impl AnalyticsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Resolve the alumni ids matching the filter, or `None` when the
    /// filter is empty (no scoping needed).
    pub async fn filtered_alumni_ids(
        &self,
        filter: &AnalyticsFilter,
    ) -> Result<Option<Vec<String>>> {
        if filter.is_empty() {
            return Ok(None);
        }

        let mut find = alumni_profiles::Entity::find();
        if let Some(faculty) = filter.faculty.as_deref() {
            find = find.filter(alumni_profiles::Column::Faculty.eq(faculty));
        }
        if let Some(year) = filter.cohort_year {
            find = find.filter(alumni_profiles::Column::CohortYear.eq(year));
        }

        let ids: Vec<String> = find
            .select_only()
            .column(alumni_profiles::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to resolve filtered alumni ids")?;

        Ok(Some(ids))
    }

    pub async fn count_alumni(&self, ids: Option<&[String]>) -> Result<u64> {
        use sea_orm::PaginatorTrait;
        scope_alumni(alumni_profiles::Entity::find(), ids)
            .count(&self.conn)
            .await
            .context("Failed to count alumni")
    }

    pub async fn alumni_by_faculty(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        scope_alumni(alumni_profiles::Entity::find(), ids)
            .select_only()
            .column(alumni_profiles::Column::Faculty)
            .column_as(alumni_profiles::Column::Id.count(), "count")
            .group_by(alumni_profiles::Column::Faculty)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group alumni by faculty")
    }

    pub async fn alumni_by_cohort(&self, ids: Option<&[String]>) -> Result<Vec<(i32, i64)>> {
        scope_alumni(alumni_profiles::Entity::find(), ids)
            .select_only()
            .column(alumni_profiles::Column::CohortYear)
            .column_as(alumni_profiles::Column::Id.count(), "count")
            .group_by(alumni_profiles::Column::CohortYear)
            .order_by_asc(alumni_profiles::Column::CohortYear)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group alumni by cohort")
    }

    pub async fn alumni_by_province(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        let mut rows: Vec<(String, i64)> = scope_alumni(alumni_profiles::Entity::find(), ids)
            .select_only()
            .column(alumni_profiles::Column::HomeProvince)
            .column_as(alumni_profiles::Column::Id.count(), "count")
            .group_by(alumni_profiles::Column::HomeProvince)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group alumni by province")?;

        rows.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(rows)
    }

    pub async fn careers_by_status(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        scope_careers(current_careers(), ids)
            .select_only()
            .column(careers::Column::Status)
            .column_as(careers::Column::Id.count(), "count")
            .group_by(careers::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group careers by status")
    }

    pub async fn careers_by_industry(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        let mut rows: Vec<(String, i64)> = scope_careers(current_careers(), ids)
            .filter(careers::Column::Industry.is_not_null())
            .select_only()
            .column(careers::Column::Industry)
            .column_as(careers::Column::Id.count(), "count")
            .group_by(careers::Column::Industry)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group careers by industry")?;

        rows.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(rows)
    }

    pub async fn careers_by_salary_band(
        &self,
        ids: Option<&[String]>,
    ) -> Result<Vec<(String, i64)>> {
        scope_careers(current_careers(), ids)
            .filter(careers::Column::SalaryBand.is_not_null())
            .select_only()
            .column(careers::Column::SalaryBand)
            .column_as(careers::Column::Id.count(), "count")
            .group_by(careers::Column::SalaryBand)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group careers by salary band")
    }

    /// Field-of-study match split over current careers that reported it.
    pub async fn field_match(&self, ids: Option<&[String]>) -> Result<Vec<(bool, i64)>> {
        scope_careers(current_careers(), ids)
            .filter(careers::Column::FieldRelated.is_not_null())
            .select_only()
            .column(careers::Column::FieldRelated)
            .column_as(careers::Column::Id.count(), "count")
            .group_by(careers::Column::FieldRelated)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group careers by field match")
    }

    pub async fn distinct_faculties(&self) -> Result<Vec<String>> {
        alumni_profiles::Entity::find()
            .select_only()
            .column(alumni_profiles::Column::Faculty)
            .group_by(alumni_profiles::Column::Faculty)
            .order_by_asc(alumni_profiles::Column::Faculty)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list distinct faculties")
    }

    pub async fn distinct_cohorts(&self) -> Result<Vec<i32>> {
        alumni_profiles::Entity::find()
            .select_only()
            .column(alumni_profiles::Column::CohortYear)
            .group_by(alumni_profiles::Column::CohortYear)
            .order_by_desc(alumni_profiles::Column::CohortYear)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list distinct cohorts")
    }

    /// Per-province, per-city counts for the distribution map.
    pub async fn province_city_counts(&self) -> Result<Vec<(String, String, i64)>> {
        alumni_profiles::Entity::find()
            .select_only()
            .column(alumni_profiles::Column::HomeProvince)
            .column(alumni_profiles::Column::HomeCity)
            .column_as(alumni_profiles::Column::Id.count(), "count")
            .group_by(alumni_profiles::Column::HomeProvince)
            .group_by(alumni_profiles::Column::HomeCity)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group alumni by province and city")
    }
}

fn scope_alumni(
    find: Select<alumni_profiles::Entity>,
    ids: Option<&[String]>,
) -> Select<alumni_profiles::Entity> {
    match ids {
        Some(ids) => find.filter(alumni_profiles::Column::Id.is_in(ids.iter().cloned())),
        None => find,
    }
}

fn scope_careers(find: Select<careers::Entity>, ids: Option<&[String]>) -> Select<careers::Entity> {
    match ids {
        Some(ids) => find.filter(careers::Column::AlumniId.is_in(ids.iter().cloned())),
        None => find,
    }
}

fn current_careers() -> Select<careers::Entity> {
    careers::Entity::find().filter(careers::Column::IsCurrent.eq(true))
}
