//! # EduPath Common Library
//!
//! Shared code for the EduPath services:
//! - Error taxonomy
//! - Subject fields and weight vector arithmetic
//! - Database schema, models and queries
//! - API request/response types
//! - Bootstrap configuration

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod weights;

pub use error::{Error, Result};
pub use fields::{SubjectField, FIELD_COUNT};
pub use weights::WeightVector;
