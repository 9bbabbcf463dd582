//! # Postgres
//!
//! This crate provides the PostgreSQL connection pool and schema for the campground listings application.

/// Database client for the campground listings application.
pub mod database;
