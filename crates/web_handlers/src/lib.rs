//! # Web Handlers for the YelpCamp Web Application
//!
//! This crate provides the page handlers, views and request plumbing for
//! YelpCamp. [`configure`] mounts every route on an actix-web app.

use actix_multipart::{MultipartError, form::MultipartFormConfig};
use actix_web::{HttpRequest, error::UrlencodedError, web};

/// Landing page, sign up, login and logout handlers
mod auth_handlers;
pub use auth_handlers::*;

/// Campground listing handlers
pub mod campground_handlers;

/// Comment handlers nested under a campground
pub mod comment_handlers;

/// Handler error type and flash-and-redirect responses
pub mod error;

/// Form bodies and their validation rules
pub mod forms;

/// Lookups that enforce existence and ownership
pub mod guards;

/// Campground writes spanning the store and the image host
pub mod listing_service;

/// `_method` override for HTML forms
pub mod method_override;

/// Shared handler state
pub mod state;

/// Page views rendered with askama
pub mod templates;

pub use error::{AppError, OrRedirect, Redirected};
pub use listing_service::{CampgroundService, Outcome};
pub use method_override::MethodOverride;
pub use state::AppState;

/// Largest campground form accepted, image included.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn unreadable_multipart(err: MultipartError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected campground form: {}", err);
    Redirected::back(
        req,
        "/campgrounds",
        AppError::Validation(format!("Could not read the submitted form: {}", err)),
    )
    .into()
}

fn unreadable_form(err: UrlencodedError, req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected form: {}", err);
    Redirected::back(
        req,
        "/",
        AppError::Validation("Could not read the submitted form".to_string()),
    )
    .into()
}

/// Registers every page route. Expects `web::Data<AppState>` to be
/// registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(MAX_UPLOAD_BYTES + 64 * 1024)
            .memory_limit(MAX_UPLOAD_BYTES)
            .error_handler(unreadable_multipart),
    )
    .app_data(web::FormConfig::default().error_handler(unreadable_form))
    .route("/", web::get().to(landing))
    .route("/register", web::get().to(register_form))
    .route("/register", web::post().to(register))
    .route("/login", web::get().to(login_form))
    .route("/login", web::post().to(login))
    .route("/logout", web::get().to(logout))
    .service(
        web::scope("/campgrounds")
            .route("", web::get().to(campground_handlers::index))
            .route("", web::post().to(campground_handlers::create))
            // before "/{id}" so it is not read as an id
            .route("/new", web::get().to(campground_handlers::new_form))
            .route("/{id}", web::get().to(campground_handlers::show))
            .route("/{id}", web::put().to(campground_handlers::update))
            .route("/{id}", web::delete().to(campground_handlers::delete))
            .route("/{id}/edit", web::get().to(campground_handlers::edit_form))
            .route(
                "/{id}/comments/new",
                web::get().to(comment_handlers::new_form),
            )
            .route("/{id}/comments", web::post().to(comment_handlers::create))
            .route(
                "/{id}/comments/{comment_id}/edit",
                web::get().to(comment_handlers::edit_form),
            )
            .route(
                "/{id}/comments/{comment_id}",
                web::put().to(comment_handlers::update),
            )
            .route(
                "/{id}/comments/{comment_id}",
                web::delete().to(comment_handlers::delete),
            ),
    );
}
