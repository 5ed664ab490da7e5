//! # CCMS Common Library
//!
//! Shared code for the CCMS course-content services including:
//! - Database schema and row models
//! - API request/response types
//! - Configuration loading
//! - Duration arithmetic and display formatting

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod duration;
pub mod error;

pub use error::{Error, Result};
