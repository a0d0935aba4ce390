pub mod attendance;
pub mod availability;
pub mod day;
pub mod schedule;
pub mod session;
pub mod shop;
pub mod solver;
pub mod user;
