//! Integration tests for adls-proxy.

pub mod config_test;
pub mod http_test;
pub mod live_test;
pub mod sql_test;
