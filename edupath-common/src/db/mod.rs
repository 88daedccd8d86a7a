//! Database models and queries

pub mod init;
pub mod models;
pub mod ratings;
pub mod revoked;
pub mod seed;
pub mod topics;
pub mod users;
pub mod weights;

pub use init::*;
pub use models::*;
