pub use super::accounts::Entity as Accounts;
pub use super::achievements::Entity as Achievements;
pub use super::alumni_profiles::Entity as AlumniProfiles;
pub use super::careers::Entity as Careers;
pub use super::testimonials::Entity as Testimonials;
