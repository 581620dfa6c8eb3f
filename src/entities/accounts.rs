use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    pub name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Canonical uppercase role tag (ALUMNI | ADMIN | LEADERSHIP)
    pub role: String,

    /// Set only for ALUMNI accounts, pointing at the one-to-one profile.
    pub alumni_id: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::alumni_profiles::Entity",
        from = "Column::AlumniId",
        to = "super::alumni_profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AlumniProfiles,
}

impl Related<super::alumni_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlumniProfiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
