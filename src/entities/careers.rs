use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "careers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub alumni_id: String,

    /// EMPLOYED | SELF_EMPLOYED | FURTHER_STUDY | NOT_EMPLOYED
    pub status: String,

    pub company: Option<String>,

    pub position: Option<String>,

    pub industry: Option<String>,

    pub work_city: Option<String>,

    pub work_province: Option<String>,

    pub work_country: String,

    /// Free-form salary band label, e.g. "5 - 10 M".
    pub salary_band: Option<String>,

    /// Whether the job matches the field of study.
    pub field_related: Option<bool>,

    pub started_at: Option<String>,

    /// At most one current career per alumni, enforced by the repository.
    pub is_current: bool,

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
