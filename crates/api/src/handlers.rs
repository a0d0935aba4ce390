pub mod attendance;
pub mod auth;
pub mod availability;
pub mod schedule;
pub mod shop;
