pub mod auth;
pub mod core;
pub mod grades;
pub mod reports;
pub mod setup;
pub mod structure;
pub mod students;
