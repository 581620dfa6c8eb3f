use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "alumni_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub student_number: String,

    pub full_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Graduation cohort year.
    pub cohort_year: i32,

    pub faculty: String,

    pub study_program: String,

    pub phone: Option<String>,

    pub home_city: String,

    pub home_province: String,

    pub home_country: String,

    pub linkedin_url: Option<String>,

    pub avatar_url: Option<String>,

    /// PUBLIC | ALUMNI_ONLY | PRIVATE
    pub profile_visibility: String,

    /// Set only through the admin verify toggle.
    pub is_verified: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::careers::Entity")]
    Careers,
    #[sea_orm(has_many = "super::achievements::Entity")]
    Achievements,
    #[sea_orm(has_many = "super::testimonials::Entity")]
    Testimonials,
    #[sea_orm(has_one = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::careers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Careers.def()
    }
}

impl Related<super::achievements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Achievements.def()
    }
}

impl Related<super::testimonials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Testimonials.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
