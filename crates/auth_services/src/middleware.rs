use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
    cookie::{Cookie, SameSite},
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::StatusCode,
};
use futures_util::future::LocalBoxFuture;
use std::{
    fmt,
    future::{Ready, ready},
    rc::Rc,
};

use crate::flash::{Flash, redirect};
use crate::jwt::{SESSION_COOKIE, SESSION_TTL_DAYS, SessionTokens};
use crate::types::SessionUser;

/// Where anonymous users are sent when they hit a guarded route.
pub const LOGIN_PATH: &str = "/login";

/// Resolves the session cookie into a [`SessionUser`] stored in the request
/// extensions. Requests without a valid session pass through anonymously;
/// a stale or forged cookie is cleared on the way out.
pub struct SessionMiddleware {
    tokens: SessionTokens,
}

impl SessionMiddleware {
    /// Creates the middleware around a token service.
    pub fn new(tokens: SessionTokens) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

/// Service that implements the session middleware logic
pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    tokens: SessionTokens,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let tokens = self.tokens.clone();

        Box::pin(async move {
            let token = req
                .cookie(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty());

            let mut stale = false;
            if let Some(token) = token {
                match tokens.session_user(&token) {
                    Ok(user) => {
                        req.extensions_mut().insert(user);
                    }
                    Err(e) => {
                        log::debug!("Ignoring invalid session cookie: {}", e);
                        stale = true;
                    }
                }
            }

            let mut res = service.call(req).await?;
            // a handler that just issued a session (login, register) wins
            let reissued = res
                .response()
                .cookies()
                .any(|cookie| cookie.name() == SESSION_COOKIE);
            if stale && !reissued {
                res.response_mut()
                    .add_removal_cookie(&session_removal_cookie())?;
            }
            Ok(res)
        })
    }
}

/// Cookie that stores a freshly issued session token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(actix_web::cookie::time::Duration::days(SESSION_TTL_DAYS))
        .finish()
}

/// Cookie that ends the session.
pub fn session_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Optional session user, for pages that render differently when logged in.
pub struct CurrentUser(pub Option<SessionUser>);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(CurrentUser(req.extensions().get::<SessionUser>().cloned())))
    }
}

/// Extractor for routes that require a login. Anonymous requests are
/// redirected to the login page before the handler body runs.
pub struct AuthenticatedUser(pub SessionUser);

impl FromRequest for AuthenticatedUser {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<SessionUser>().cloned();

        ready(match user {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => Err(LoginRequired),
        })
    }
}

/// Rejection produced by [`AuthenticatedUser`].
#[derive(Debug)]
pub struct LoginRequired;

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("You need to be logged in to do that")
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        redirect(LOGIN_PATH, Some(Flash::error(self.to_string())))
    }
}
