pub mod auth;
pub mod grading;
pub mod progression;
