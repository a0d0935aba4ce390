#[path = "../test_utils.rs"]
mod test_utils;

mod attendance_test;
mod availability_test;
mod schedule_test;
mod shop_test;
