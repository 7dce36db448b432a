// Library exports for the binaries and integration tests
pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod utils;
pub mod validation;
