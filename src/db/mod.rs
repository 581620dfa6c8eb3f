use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::TestimonialStatus;
use crate::entities::{achievements, testimonials};

pub mod migrator;
pub mod repositories;

pub use repositories::account::Account;
pub use repositories::achievement::NewAchievement;
pub use repositories::alumni::{AlumniListQuery, CareerBrief, NewAlumni, ProfileUpdate};
pub use repositories::analytics::AnalyticsFilter;
pub use repositories::career::{CareerListQuery, NewCareer};

pub use crate::entities::alumni_profiles::Model as AlumniProfile;
pub use crate::entities::careers::Model as Career;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn alumni_repo(&self) -> repositories::alumni::AlumniRepository {
        repositories::alumni::AlumniRepository::new(self.conn.clone())
    }

    fn career_repo(&self) -> repositories::career::CareerRepository {
        repositories::career::CareerRepository::new(self.conn.clone())
    }

    fn achievement_repo(&self) -> repositories::achievement::AchievementRepository {
        repositories::achievement::AchievementRepository::new(self.conn.clone())
    }

    fn testimonial_repo(&self) -> repositories::testimonial::TestimonialRepository {
        repositories::testimonial::TestimonialRepository::new(self.conn.clone())
    }

    fn analytics_repo(&self) -> repositories::analytics::AnalyticsRepository {
        repositories::analytics::AnalyticsRepository::new(self.conn.clone())
    }

    // ========== Accounts ==========

    pub async fn account_email_exists(&self, email: &str) -> Result<bool> {
        self.account_repo().email_exists(email).await
    }

    pub async fn verify_account_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>> {
        self.account_repo().verify_password(email, password).await
    }

    pub async fn update_account_password(
        &self,
        email: &str,
        new_password: &str,
        config: &crate::config::SecurityConfig,
    ) -> Result<()> {
        self.account_repo()
            .update_password(email, new_password, config)
            .await
    }

    // ========== Alumni profiles ==========

    pub async fn get_alumni(&self, id: &str) -> Result<Option<AlumniProfile>> {
        self.alumni_repo().get(id).await
    }

    pub async fn get_alumni_by_email(&self, email: &str) -> Result<Option<AlumniProfile>> {
        self.alumni_repo().get_by_email(email).await
    }

    pub async fn student_number_exists(&self, student_number: &str) -> Result<bool> {
        self.alumni_repo().student_number_exists(student_number).await
    }

    pub async fn alumni_email_exists(&self, email: &str) -> Result<bool> {
        self.alumni_repo().email_exists(email).await
    }

    /// Register an alumni: hash the password off the async runtime, then
    /// create the profile and its account in one transaction.
    pub async fn register_alumni(
        &self,
        input: &NewAlumni,
        password: &str,
        config: &crate::config::SecurityConfig,
    ) -> Result<AlumniProfile> {
        let password = password.to_string();
        let config = config.clone();
        let hash = tokio::task::spawn_blocking(move || {
            repositories::account::hash_password(&password, Some(&config))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task panicked: {e}"))??;

        self.alumni_repo().create_with_account(input, hash).await
    }

    pub async fn update_alumni_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<AlumniProfile>> {
        self.alumni_repo().update_profile(id, update).await
    }

    pub async fn set_alumni_verified(&self, id: &str, verified: bool) -> Result<Option<AlumniProfile>> {
        self.alumni_repo().set_verified(id, verified).await
    }

    pub async fn delete_alumni(&self, id: &str) -> Result<bool> {
        self.alumni_repo().delete_cascade(id).await
    }

    pub async fn list_alumni(
        &self,
        query: &AlumniListQuery,
    ) -> Result<(Vec<(AlumniProfile, Option<CareerBrief>)>, u64)> {
        self.alumni_repo().list(query).await
    }

    pub async fn alumni_network(&self) -> Result<Vec<(AlumniProfile, Option<CareerBrief>)>> {
        self.alumni_repo().network().await
    }

    pub async fn recent_alumni(
        &self,
        limit: u64,
    ) -> Result<Vec<(AlumniProfile, Option<CareerBrief>)>> {
        self.alumni_repo().recent(limit).await
    }

    pub async fn count_alumni(&self) -> Result<u64> {
        self.alumni_repo().count_all().await
    }

    pub async fn count_verified_alumni(&self) -> Result<u64> {
        self.alumni_repo().count_verified().await
    }

    pub async fn count_alumni_with_career(&self) -> Result<u64> {
        self.alumni_repo().count_with_career().await
    }

    pub async fn count_alumni_with_achievements(&self) -> Result<u64> {
        self.alumni_repo().count_with_achievements().await
    }

    pub async fn broadcast_recipients(
        &self,
        faculty: Option<&str>,
        cohort_year: Option<i32>,
        unverified_only: bool,
    ) -> Result<Vec<(String, String)>> {
        self.alumni_repo()
            .broadcast_recipients(faculty, cohort_year, unverified_only)
            .await
    }

    // ========== Careers ==========

    pub async fn careers_for_alumni(&self, alumni_id: &str) -> Result<Vec<Career>> {
        self.career_repo().for_alumni(alumni_id).await
    }

    pub async fn replace_current_career(
        &self,
        alumni_id: &str,
        input: &NewCareer,
    ) -> Result<Career> {
        self.career_repo().replace_current(alumni_id, input).await
    }

    pub async fn list_careers_with_alumni(
        &self,
        query: &CareerListQuery,
    ) -> Result<(Vec<(Career, Option<AlumniProfile>)>, u64)> {
        self.career_repo().list_with_alumni(query).await
    }

    pub async fn current_career_status_counts(&self) -> Result<Vec<(String, i64)>> {
        self.career_repo().current_status_counts().await
    }

    // ========== Achievements ==========

    pub async fn achievements_for_alumni(
        &self,
        alumni_id: &str,
    ) -> Result<Vec<achievements::Model>> {
        self.achievement_repo().for_alumni(alumni_id).await
    }

    pub async fn create_achievement(
        &self,
        alumni_id: &str,
        input: &NewAchievement,
    ) -> Result<achievements::Model> {
        self.achievement_repo().create(alumni_id, input).await
    }

    pub async fn list_achievements_with_alumni(
        &self,
    ) -> Result<Vec<(achievements::Model, Option<AlumniProfile>)>> {
        self.achievement_repo().list_with_alumni().await
    }

    pub async fn delete_achievement(&self, id: &str) -> Result<bool> {
        self.achievement_repo().delete(id).await
    }

    // ========== Testimonials ==========

    pub async fn testimonials_for_alumni(
        &self,
        alumni_id: &str,
    ) -> Result<Vec<testimonials::Model>> {
        self.testimonial_repo().for_alumni(alumni_id).await
    }

    pub async fn create_testimonial(
        &self,
        alumni_id: &str,
        content: &str,
    ) -> Result<testimonials::Model> {
        self.testimonial_repo().create(alumni_id, content).await
    }

    pub async fn approved_testimonials(
        &self,
    ) -> Result<Vec<(testimonials::Model, Option<AlumniProfile>)>> {
        self.testimonial_repo().approved_with_alumni().await
    }

    pub async fn list_testimonials_with_alumni(
        &self,
    ) -> Result<Vec<(testimonials::Model, Option<AlumniProfile>)>> {
        self.testimonial_repo().list_with_alumni().await
    }

    pub async fn set_testimonial_status(
        &self,
        id: &str,
        status: TestimonialStatus,
    ) -> Result<Option<testimonials::Model>> {
        self.testimonial_repo().set_status(id, status).await
    }

    pub async fn delete_testimonial(&self, id: &str) -> Result<bool> {
        self.testimonial_repo().delete(id).await
    }

    // ========== Analytics ==========

    pub async fn filtered_alumni_ids(
        &self,
        filter: &AnalyticsFilter,
    ) -> Result<Option<Vec<String>>> {
        self.analytics_repo().filtered_alumni_ids(filter).await
    }

    pub async fn analytics_alumni_count(&self, ids: Option<&[String]>) -> Result<u64> {
        self.analytics_repo().count_alumni(ids).await
    }

    pub async fn alumni_by_faculty(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        self.analytics_repo().alumni_by_faculty(ids).await
    }

    pub async fn alumni_by_cohort(&self, ids: Option<&[String]>) -> Result<Vec<(i32, i64)>> {
        self.analytics_repo().alumni_by_cohort(ids).await
    }

    pub async fn alumni_by_province(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        self.analytics_repo().alumni_by_province(ids).await
    }

    pub async fn careers_by_status(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        self.analytics_repo().careers_by_status(ids).await
    }

    pub async fn careers_by_industry(&self, ids: Option<&[String]>) -> Result<Vec<(String, i64)>> {
        self.analytics_repo().careers_by_industry(ids).await
    }

    pub async fn careers_by_salary_band(
        &self,
        ids: Option<&[String]>,
    ) -> Result<Vec<(String, i64)>> {
        self.analytics_repo().careers_by_salary_band(ids).await
    }

    pub async fn career_field_match(&self, ids: Option<&[String]>) -> Result<Vec<(bool, i64)>> {
        self.analytics_repo().field_match(ids).await
    }

    pub async fn distinct_faculties(&self) -> Result<Vec<String>> {
        self.analytics_repo().distinct_faculties().await
    }

    pub async fn distinct_cohorts(&self) -> Result<Vec<i32>> {
        self.analytics_repo().distinct_cohorts().await
    }

    pub async fn province_city_counts(&self) -> Result<Vec<(String, String, i64)>> {
        self.analytics_repo().province_city_counts().await
    }
}
