/// Language model used to rebalance schedules
pub mod optimizer;
/// External scheduling service
pub mod solver;
