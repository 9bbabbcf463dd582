//! # Image Hosting
//!
//! This crate uploads campground images to an external image host and
//! removes them again when a listing changes or goes away.

/// Image host trait, the Cloudinary client and the cleanup helper.
pub mod service;
/// Types shared by image host implementations.
pub mod types;

pub use service::{CloudinaryClient, CloudinaryConfig, DisabledImageHost, ImageHost, release};
pub use types::{HostedImage, ImageCleanup, ImageError, ImageUpload, is_allowed_image};
