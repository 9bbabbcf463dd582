//! # Auth Services
//!
//! This crate provides user accounts and session handling for the application.
//! It includes password verification, signed session cookies, flash messages,
//! the session middleware and the ownership policy used by the route guards.

/// One-shot flash messages carried in a cookie.
pub mod flash;
/// Signed session tokens stored in the session cookie.
pub mod jwt;
/// Middleware and extractors exposing the session user to handlers.
pub mod middleware;
/// Ownership policy shared by every guarded resource.
pub mod policy;
/// Service definitions for user registration and login.
pub mod service;
/// Storage backends for user accounts.
pub mod store;
/// Types and structures used in authentication services.
pub mod types;
