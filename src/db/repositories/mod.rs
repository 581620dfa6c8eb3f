pub mod account;
pub mod achievement;
pub mod alumni;
pub mod analytics;
pub mod career;
pub mod testimonial;
