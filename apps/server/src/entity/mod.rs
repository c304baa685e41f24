//! SeaORM entity definitions.

pub mod settings;
pub mod test_case;
pub mod test_result;
pub mod test_run;
pub mod test_suite;
pub mod user;
