use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::domain::CareerStatus;
use crate::entities::{alumni_profiles, careers};

/// Input for a new current-career record.
#[derive(Debug, Clone)]
pub struct NewCareer {
    pub status: CareerStatus,
    pub company: Option<String>,
    pub position: Option<String>,
    pub industry: Option<String>,
    pub work_city: Option<String>,
    pub work_province: Option<String>,
    pub work_country: Option<String>,
    pub salary_band: Option<String>,
    pub field_related: Option<bool>,
    pub started_at: Option<String>,
}

/// Filters for the admin career listing.
#[derive(Debug, Clone, Default)]
pub struct CareerListQuery {
    pub limit: u64,
    pub offset: u64,
    pub status: Option<CareerStatus>,
    pub search: Option<String>,
}

pub struct CareerRepository {
    conn: DatabaseConnection,
}

impl CareerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn for_alumni(&self, alumni_id: &str) -> Result<Vec<careers::Model>> {
        careers::Entity::find()
            .filter(careers::Column::AlumniId.eq(alumni_id))
            .order_by_desc(careers::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list careers for alumni")
    }

    /// Demote any previous current career and insert the new one as a
    /// single transaction, so a crash can never leave an alumni with zero
    /// or two current careers.
    pub async fn replace_current(
        &self,
        alumni_id: &str,
        input: &NewCareer,
    ) -> Result<careers::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = careers::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            alumni_id: Set(alumni_id.to_string()),
            status: Set(input.status.as_str().to_string()),
            company: Set(input.company.clone()),
            position: Set(input.position.clone()),
            industry: Set(input.industry.clone()),
            work_city: Set(input.work_city.clone()),
            work_province: Set(input.work_province.clone()),
            work_country: Set(input
                .work_country
                .clone()
                .unwrap_or_else(|| "Indonesia".to_string())),
            salary_band: Set(input.salary_band.clone()),
            field_related: Set(input.field_related),
            started_at: Set(input.started_at.clone()),
            is_current: Set(true),
            created_at: Set(now),
        };

        let txn = self.conn.begin().await?;

        careers::Entity::update_many()
            .col_expr(careers::Column::IsCurrent, false.into())
            .filter(careers::Column::AlumniId.eq(alumni_id))
            .filter(careers::Column::IsCurrent.eq(true))
            .exec(&txn)
            .await?;

        let created = active
            .insert(&txn)
            .await
            .context("Failed to insert career record")?;

        txn.commit().await?;

        Ok(created)
    }

    pub async fn list_with_alumni(
        &self,
        query: &CareerListQuery,
    ) -> Result<(Vec<(careers::Model, Option<alumni_profiles::Model>)>, u64)> {
        let mut find = careers::Entity::find();

        if let Some(status) = query.status {
            find = find.filter(careers::Column::Status.eq(status.as_str()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(
                Condition::any()
                    .add(alumni_profiles::Column::FullName.contains(search))
                    .add(alumni_profiles::Column::StudentNumber.contains(search))
                    .add(careers::Column::Company.contains(search)),
            );
        }

        let total = find
            .clone()
            .join(JoinType::InnerJoin, careers::Relation::AlumniProfiles.def())
            .count(&self.conn)
            .await?;

        let rows = find
            .find_also_related(alumni_profiles::Entity)
            .order_by_desc(careers::Column::CreatedAt)
            .limit(query.limit)
            .offset(query.offset)
            .all(&self.conn)
            .await
            .context("Failed to list careers with alumni")?;

        Ok((rows, total))
    }

    /// Count of current careers per status, for dashboards and analytics.
    pub async fn current_status_counts(&self) -> Result<Vec<(String, i64)>> {
        careers::Entity::find()
            .select_only()
            .column(careers::Column::Status)
            .column_as(careers::Column::Id.count(), "count")
            .filter(careers::Column::IsCurrent.eq(true))
            .group_by(careers::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to group careers by status")
    }
}
