//! HTTP API handlers for edupath-api

pub mod auth;
pub mod health;
pub mod predict;
pub mod topics;
pub mod users;

pub use health::health_routes;
