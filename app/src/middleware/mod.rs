//! Application middleware
//!
//! Each middleware has its own dedicated file following the framework convention.

mod response_time;

pub use response_time::ResponseTime;
