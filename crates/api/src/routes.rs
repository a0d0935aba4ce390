pub mod attendance;
pub mod auth;
pub mod availability;
pub mod health;
pub mod schedule;
pub mod shop;
