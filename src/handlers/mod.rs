pub mod auth;
pub mod chapter;
pub mod child;
pub mod payment;
pub mod quiz;
pub mod subject;
