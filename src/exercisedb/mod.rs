//! Exercise lookup API integration module.
//!
//! Provides the cached, retrying client for exercise records.

pub mod client;
pub mod models;

pub use client::{ExerciseDbClient, Source};
pub use models::Exercise;
