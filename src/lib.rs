pub mod config;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod scoring;
pub mod services;
pub mod store;
pub mod throttle;
pub mod types;
