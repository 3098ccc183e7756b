pub mod check_config;
pub mod once;
pub mod preview;
pub mod run;
