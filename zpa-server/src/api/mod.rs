//! HTTP API handlers for zpa-server

pub mod auth;
pub mod data;
pub mod health;
pub mod stats;

pub use auth::{login, LoginGate};
pub use data::get_data;
pub use health::health_routes;
pub use stats::get_stats;
