//! # Campgrounds
//!
//! This crate provides the campground and comment models and the stores that
//! persist them, plus the fixture seeder used in development.

/// Campground and comment models
mod types;
pub use types::*;

/// Storage trait and the PostgreSQL implementation
mod store;
pub use store::*;

/// Process-local storage for development and tests
mod memory;
pub use memory::*;

/// Fixture data for a fresh database
pub mod seed;
