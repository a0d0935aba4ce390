pub mod attendance;
pub mod shops;
pub mod users;
