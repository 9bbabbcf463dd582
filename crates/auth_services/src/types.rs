use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Form submitted to `POST /register`
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username chosen by the user
    #[validate(
        custom(function = "not_blank", message = "Username is required"),
        length(max = 64, message = "Username must be at most 64 characters")
    )]
    pub username: String,

    /// Password for the user account
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Optional code granting admin rights
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// Form submitted to `POST /login`
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the account
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User model representing the database schema
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Username, unique across accounts
    pub username: String,
    /// Bcrypt hash of the user's password
    pub password_hash: String,
    /// Whether the user may act on resources they do not own
    pub is_admin: bool,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username of the new account
    pub username: String,
    /// Already-hashed password
    pub password_hash: String,
    /// Admin flag
    pub is_admin: bool,
}

/// The user attached to the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Username shown in views and copied into author snapshots
    pub username: String,
    /// Admin flag
    pub is_admin: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Claims carried by the session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the user ID
    pub sub: String,
    /// Username of the user
    pub username: String,
    /// Admin flag at login time
    pub admin: bool,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is already registered
    #[error("A user with the given username is already registered")]
    UsernameTaken,

    /// The provided credentials are invalid
    #[error("Password or username is incorrect")]
    InvalidCredentials,

    /// A database error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The session token could not be created or verified
    #[error("Session token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// An error occurred while validating input data
    #[error("{0}")]
    Validation(String),
}

/// Rejects empty and whitespace-only input. Pair it with a `length(max)`
/// rule so that a missing value and an over-long one read differently.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Flattens validator output into a single user-facing sentence.
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
