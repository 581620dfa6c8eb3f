use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{achievements, alumni_profiles};

#[derive(Debug, Clone)]
pub struct NewAchievement {
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
}

pub struct AchievementRepository {
    conn: DatabaseConnection,
}

impl AchievementRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn for_alumni(&self, alumni_id: &str) -> Result<Vec<achievements::Model>> {
        achievements::Entity::find()
            .filter(achievements::Column::AlumniId.eq(alumni_id))
            .order_by_desc(achievements::Column::Year)
            .all(&self.conn)
            .await
            .context("Failed to list achievements for alumni")
    }

    pub async fn create(
        &self,
        alumni_id: &str,
        input: &NewAchievement,
    ) -> Result<achievements::Model> {
        let active = achievements::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            alumni_id: Set(alumni_id.to_string()),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            year: Set(input.year),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert achievement")
    }

    pub async fn list_with_alumni(
        &self,
    ) -> Result<Vec<(achievements::Model, Option<alumni_profiles::Model>)>> {
        achievements::Entity::find()
            .find_also_related(alumni_profiles::Entity)
            .order_by_desc(achievements::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list achievements")
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = achievements::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete achievement")?;
        Ok(result.rows_affected > 0)
    }
}
