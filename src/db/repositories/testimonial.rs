use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::TestimonialStatus;
use crate::entities::{alumni_profiles, testimonials};

pub struct TestimonialRepository {
    conn: DatabaseConnection,
}

impl TestimonialRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn for_alumni(&self, alumni_id: &str) -> Result<Vec<testimonials::Model>> {
        testimonials::Entity::find()
            .filter(testimonials::Column::AlumniId.eq(alumni_id))
            .order_by_desc(testimonials::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list testimonials for alumni")
    }

    /// New submissions always land as PENDING and wait for moderation.
    pub async fn create(&self, alumni_id: &str, content: &str) -> Result<testimonials::Model> {
        let active = testimonials::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            alumni_id: Set(alumni_id.to_string()),
            content: Set(content.to_string()),
            status: Set(TestimonialStatus::Pending.as_str().to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert testimonial")
    }

    /// Public listing: approved testimonials only.
    pub async fn approved_with_alumni(
        &self,
    ) -> Result<Vec<(testimonials::Model, Option<alumni_profiles::Model>)>> {
        testimonials::Entity::find()
            .filter(testimonials::Column::Status.eq(TestimonialStatus::Approved.as_str()))
            .find_also_related(alumni_profiles::Entity)
            .order_by_desc(testimonials::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list approved testimonials")
    }

    /// Moderation queue: everything, newest first.
    pub async fn list_with_alumni(
        &self,
    ) -> Result<Vec<(testimonials::Model, Option<alumni_profiles::Model>)>> {
        testimonials::Entity::find()
            .find_also_related(alumni_profiles::Entity)
            .order_by_desc(testimonials::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list testimonials")
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: TestimonialStatus,
    ) -> Result<Option<testimonials::Model>> {
        let Some(testimonial) = testimonials::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query testimonial by id")?
        else {
            return Ok(None);
        };

        let mut active: testimonials::ActiveModel = testimonial.into();
        active.status = Set(status.as_str().to_string());

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = testimonials::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete testimonial")?;
        Ok(result.rows_affected > 0)
    }
}
