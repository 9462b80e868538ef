pub mod config;
pub mod connection;
pub mod query_executor;
pub mod result_set;
