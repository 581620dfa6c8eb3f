pub mod prelude;

pub mod accounts;
pub mod achievements;
pub mod alumni_profiles;
pub mod careers;
pub mod testimonials;
