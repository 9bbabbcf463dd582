use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthError, Claims, SessionUser};

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "yelpcamp_session";

/// How long a login stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Issues and verifies the HS256 tokens stored in the session cookie.
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionTokens {
    /// Creates a token service keyed by `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Issues a session token for `user`.
    pub fn issue(&self, user: &SessionUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            admin: user.is_admin,
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a token and returns the claims it carries.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies a token and rebuilds the session user from it.
    pub fn session_user(&self, token: &str) -> Result<SessionUser, AuthError> {
        let claims = self.verify_token(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;

        Ok(SessionUser {
            id,
            username: claims.username,
            is_admin: claims.admin,
        })
    }
}
