use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "testimonials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub alumni_id: String,

    pub content: String,

    /// PENDING | APPROVED | REJECTED
    pub status: String,

    pub created_at: String,
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
