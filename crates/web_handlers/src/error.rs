use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use auth_services::flash::{Flash, back_location, redirect};
use auth_services::types::AuthError;
use campgrounds::StoreError;
use image_hosting::ImageError;

/// Every failure a page handler can run into.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Account or session failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Campground store failure, including not-found lookups
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Image host failure
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The session user does not own the resource
    #[error("You don't have permission to do that")]
    PermissionDenied,

    /// Invalid form input
    #[error("{0}")]
    Validation(String),

    /// A view failed to render
    #[error("Could not render page: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    /// Message shown to the user. Internal failures are logged and replaced
    /// by a generic sentence.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(AuthError::Database(_))
            | AppError::Auth(AuthError::PasswordHash(_))
            | AppError::Auth(AuthError::Jwt(_))
            | AppError::Store(StoreError::Database(_))
            | AppError::Template(_) => {
                log::error!("{}", self);
                "Something went wrong, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Failures with nowhere sensible to redirect to, such as a page that cannot
/// render, are answered in place.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.user_message())
    }
}

/// A failed request answered with a flash message and a redirect.
pub struct Redirected {
    location: String,
    error: AppError,
}

impl Redirected {
    /// Redirects to `location`.
    pub fn to(location: impl Into<String>, error: AppError) -> Self {
        Self {
            location: location.into(),
            error,
        }
    }

    /// Redirects to the referring page, or `fallback` when there is none.
    pub fn back(req: &HttpRequest, fallback: &str, error: AppError) -> Self {
        Self::to(back_location(req, fallback), error)
    }
}

impl fmt::Debug for Redirected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redirected")
            .field("location", &self.location)
            .field("error", &self.error)
            .finish()
    }
}

impl fmt::Display for Redirected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (redirecting to {})", self.error, self.location)
    }
}

impl ResponseError for Redirected {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        redirect(&self.location, Some(Flash::error(self.error.user_message())))
    }
}

/// Converts handler failures into flash-and-redirect responses.
pub trait OrRedirect<T> {
    /// On error, redirect to the referring page or `fallback`.
    fn or_back(self, req: &HttpRequest, fallback: &str) -> Result<T, Redirected>;

    /// On error, redirect to `location`.
    fn or_redirect(self, location: &str) -> Result<T, Redirected>;
}

impl<T, E: Into<AppError>> OrRedirect<T> for Result<T, E> {
    fn or_back(self, req: &HttpRequest, fallback: &str) -> Result<T, Redirected> {
        self.map_err(|e| Redirected::back(req, fallback, e.into()))
    }

    fn or_redirect(self, location: &str) -> Result<T, Redirected> {
        self.map_err(|e| Redirected::to(location, e.into()))
    }
}
