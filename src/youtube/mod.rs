//! Video search API integration module.
//!
//! Provides the client for finding videos related to an exercise.

pub mod client;
pub mod models;

pub use client::VideoSearchClient;
pub use models::VideoSummary;
