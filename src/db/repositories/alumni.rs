use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::ProfileVisibility;
use crate::entities::{accounts, achievements, alumni_profiles, careers, testimonials};

/// Filters for the admin alumni listing.
#[derive(Debug, Clone, Default)]
pub struct AlumniListQuery {
    pub limit: u64,
    pub offset: u64,
    pub verified: Option<bool>,
    pub search: Option<String>,
    pub faculty: Option<String>,
    pub study_program: Option<String>,
}

/// Current-career summary attached to listing rows.
#[derive(Debug, Clone)]
pub struct CareerBrief {
    pub status: String,
    pub company: Option<String>,
    pub position: Option<String>,
}

/// Registration input; the linked ALUMNI account is created in the same
/// transaction.
#[derive(Debug, Clone)]
pub struct NewAlumni {
    pub student_number: String,
    pub full_name: String,
    pub email: String,
    pub cohort_year: i32,
    pub faculty: String,
    pub study_program: String,
    pub phone: Option<String>,
    pub home_city: String,
    pub home_province: String,
}

/// Self-service profile update; fields mirror the profile form.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub home_city: String,
    pub home_province: String,
    pub profile_visibility: ProfileVisibility,
}

pub struct AlumniRepository {
    conn: DatabaseConnection,
}

impl AlumniRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: &str) -> Result<Option<alumni_profiles::Model>> {
        alumni_profiles::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query alumni profile by id")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<alumni_profiles::Model>> {
        alumni_profiles::Entity::find()
            .filter(alumni_profiles::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query alumni profile by email")
    }

    pub async fn student_number_exists(&self, student_number: &str) -> Result<bool> {
        Ok(alumni_profiles::Entity::find()
            .filter(alumni_profiles::Column::StudentNumber.eq(student_number))
            .one(&self.conn)
            .await
            .context("Failed to query alumni profile by student number")?
            .is_some())
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    /// Create the profile and its linked ALUMNI account in one transaction
    /// so registration never leaves an orphan half.
    pub async fn create_with_account(
        &self,
        input: &NewAlumni,
        password_hash: String,
    ) -> Result<alumni_profiles::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let id = uuid::Uuid::new_v4().to_string();

        let profile = alumni_profiles::ActiveModel {
            id: Set(id.clone()),
            student_number: Set(input.student_number.clone()),
            full_name: Set(input.full_name.clone()),
            email: Set(input.email.clone()),
            cohort_year: Set(input.cohort_year),
            faculty: Set(input.faculty.clone()),
            study_program: Set(input.study_program.clone()),
            phone: Set(input.phone.clone()),
            home_city: Set(input.home_city.clone()),
            home_province: Set(input.home_province.clone()),
            home_country: Set("Indonesia".to_string()),
            linkedin_url: Set(None),
            avatar_url: Set(None),
            profile_visibility: Set(ProfileVisibility::AlumniOnly.as_str().to_string()),
            is_verified: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
        };

        let account = accounts::ActiveModel {
            email: Set(input.email.clone()),
            name: Set(input.full_name.clone()),
            password_hash: Set(password_hash),
            role: Set(crate::domain::Role::Alumni.as_str().to_string()),
            alumni_id: Set(Some(id)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let txn = self.conn.begin().await?;
        let created = profile.insert(&txn).await.context("Failed to insert alumni profile")?;
        account.insert(&txn).await.context("Failed to insert alumni account")?;
        txn.commit().await?;

        Ok(created)
    }

    pub async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<alumni_profiles::Model>> {
        let Some(profile) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: alumni_profiles::ActiveModel = profile.into();
        active.full_name = Set(update.full_name.clone());
        active.phone = Set(update.phone.clone());
        active.linkedin_url = Set(update.linkedin_url.clone());
        active.home_city = Set(update.home_city.clone());
        active.home_province = Set(update.home_province.clone());
        active.profile_visibility = Set(update.profile_visibility.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Idempotent verification toggle: setting the flag to its current
    /// value is a no-op success, not an error.
    pub async fn set_verified(
        &self,
        id: &str,
        verified: bool,
    ) -> Result<Option<alumni_profiles::Model>> {
        let Some(profile) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: alumni_profiles::ActiveModel = profile.into();
        active.is_verified = Set(verified);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Remove the profile together with its careers, achievements,
    /// testimonials and the linked account, all in one transaction.
    pub async fn delete_cascade(&self, id: &str) -> Result<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }

        let txn = self.conn.begin().await?;

        careers::Entity::delete_many()
            .filter(careers::Column::AlumniId.eq(id))
            .exec(&txn)
            .await?;
        achievements::Entity::delete_many()
            .filter(achievements::Column::AlumniId.eq(id))
            .exec(&txn)
            .await?;
        testimonials::Entity::delete_many()
            .filter(testimonials::Column::AlumniId.eq(id))
            .exec(&txn)
            .await?;
        accounts::Entity::delete_many()
            .filter(accounts::Column::AlumniId.eq(id))
            .exec(&txn)
            .await?;
        alumni_profiles::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(true)
    }

    pub async fn list(
        &self,
        query: &AlumniListQuery,
    ) -> Result<(Vec<(alumni_profiles::Model, Option<CareerBrief>)>, u64)> {
        let mut find = alumni_profiles::Entity::find();

        if let Some(verified) = query.verified {
            find = find.filter(alumni_profiles::Column::IsVerified.eq(verified));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            find = find.filter(
                Condition::any()
                    .add(alumni_profiles::Column::FullName.contains(search))
                    .add(alumni_profiles::Column::StudentNumber.contains(search))
                    .add(alumni_profiles::Column::Email.contains(search)),
            );
        }
        if let Some(faculty) = query.faculty.as_deref().filter(|f| !f.is_empty()) {
            find = find.filter(alumni_profiles::Column::Faculty.contains(faculty));
        }
        if let Some(program) = query.study_program.as_deref().filter(|p| !p.is_empty()) {
            find = find.filter(alumni_profiles::Column::StudyProgram.contains(program));
        }

        let total = find.clone().count(&self.conn).await?;

        let rows = find
            .order_by_desc(alumni_profiles::Column::CreatedAt)
            .limit(query.limit)
            .offset(query.offset)
            .all(&self.conn)
            .await
            .context("Failed to list alumni profiles")?;

        self.attach_current_careers(rows).await.map(|r| (r, total))
    }

    /// Directory listing for the alumni network: private profiles excluded.
    pub async fn network(&self) -> Result<Vec<(alumni_profiles::Model, Option<CareerBrief>)>> {
        let rows = alumni_profiles::Entity::find()
            .filter(
                alumni_profiles::Column::ProfileVisibility.is_in([
                    ProfileVisibility::Public.as_str(),
                    ProfileVisibility::AlumniOnly.as_str(),
                ]),
            )
            .order_by_asc(alumni_profiles::Column::FullName)
            .all(&self.conn)
            .await
            .context("Failed to list alumni network")?;

        self.attach_current_careers(rows).await
    }

    pub async fn recent(
        &self,
        limit: u64,
    ) -> Result<Vec<(alumni_profiles::Model, Option<CareerBrief>)>> {
        let rows = alumni_profiles::Entity::find()
            .order_by_desc(alumni_profiles::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent alumni")?;

        self.attach_current_careers(rows).await
    }

    pub async fn count_all(&self) -> Result<u64> {
        alumni_profiles::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count alumni")
    }

    pub async fn count_verified(&self) -> Result<u64> {
        alumni_profiles::Entity::find()
            .filter(alumni_profiles::Column::IsVerified.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count verified alumni")
    }

    /// Number of alumni with at least one career record.
    pub async fn count_with_career(&self) -> Result<u64> {
        let ids: Vec<String> = careers::Entity::find()
            .select_only()
            .column(careers::Column::AlumniId)
            .group_by(careers::Column::AlumniId)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids.len() as u64)
    }

    /// Number of alumni with at least one achievement record.
    pub async fn count_with_achievements(&self) -> Result<u64> {
        let ids: Vec<String> = achievements::Entity::find()
            .select_only()
            .column(achievements::Column::AlumniId)
            .group_by(achievements::Column::AlumniId)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids.len() as u64)
    }

    /// Recipient set for the broadcast handler.
    pub async fn broadcast_recipients(
        &self,
        faculty: Option<&str>,
        cohort_year: Option<i32>,
        unverified_only: bool,
    ) -> Result<Vec<(String, String)>> {
        let mut find = alumni_profiles::Entity::find();

        if let Some(faculty) = faculty {
            find = find.filter(alumni_profiles::Column::Faculty.eq(faculty));
        }
        if let Some(year) = cohort_year {
            find = find.filter(alumni_profiles::Column::CohortYear.eq(year));
        }
        if unverified_only {
            find = find.filter(alumni_profiles::Column::IsVerified.eq(false));
        }

        let rows: Vec<(String, String)> = find
            .select_only()
            .column(alumni_profiles::Column::Email)
            .column(alumni_profiles::Column::FullName)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to resolve broadcast recipients")?;

        Ok(rows)
    }

    /// Batch-fetch the current career per alumni to avoid N+1 queries.
    async fn attach_current_careers(
        &self,
        rows: Vec<alumni_profiles::Model>,
    ) -> Result<Vec<(alumni_profiles::Model, Option<CareerBrief>)>> {
        let ids: Vec<String> = rows.iter().map(|a| a.id.clone()).collect();

        let mut current: HashMap<String, CareerBrief> = HashMap::new();
        if !ids.is_empty() {
            let career_rows = careers::Entity::find()
                .filter(careers::Column::AlumniId.is_in(ids))
                .filter(careers::Column::IsCurrent.eq(true))
                .all(&self.conn)
                .await
                .context("Failed to fetch current careers")?;

            for c in career_rows {
                current.insert(
                    c.alumni_id.clone(),
                    CareerBrief {
                        status: c.status,
                        company: c.company,
                        position: c.position,
                    },
                );
            }
        }

        Ok(rows
            .into_iter()
            .map(|a| {
                let brief = current.remove(&a.id);
                (a, brief)
            })
            .collect())
    }
}
