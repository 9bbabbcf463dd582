use bcrypt::{DEFAULT_COST, hash, verify};
use std::sync::Arc;

use crate::store::UserStore;
use crate::types::{AuthError, LoginRequest, NewUser, RegisterRequest, User};

/// A service for handling user registration and credential checks.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    admin_code: Option<String>,
    hash_cost: u32,
}

impl AuthService {
    /// Creates a service over `users`. Registrations presenting `admin_code`
    /// are created as admins; `None` disables admin registration.
    pub fn new(users: Arc<dyn UserStore>, admin_code: Option<String>) -> Self {
        Self {
            users,
            admin_code: admin_code.filter(|code| !code.is_empty()),
            hash_cost: DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost factor.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Registers a new user with a hashed password.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash(&request.password, self.hash_cost)?;
        let is_admin = self.grants_admin(request.admin_code.as_deref());

        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                password_hash,
                is_admin,
            })
            .await?;

        log::info!("Registered user {} (admin: {})", user.username, user.is_admin);
        Ok(user)
    }

    /// Verifies the user's password against the stored hash.
    pub async fn verify_password(&self, request: &LoginRequest) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_username(request.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = verify(&request.password, &user.password_hash)?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    fn grants_admin(&self, presented: Option<&str>) -> bool {
        match (&self.admin_code, presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }
}
