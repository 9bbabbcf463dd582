use actix_web::{HttpRequest, HttpResponse, Result, web};

use auth_services::flash::{Flash, redirect};
use auth_services::middleware::{CurrentUser, session_cookie, session_removal_cookie};
use auth_services::types::*;

use crate::error::OrRedirect;
use crate::forms::validate_form;
use crate::state::AppState;
use crate::templates::{LandingPage, LoginPage, PageContext, RegisterPage, render};

/// Renders the landing page.
pub async fn landing(req: HttpRequest, user: CurrentUser) -> Result<HttpResponse> {
    let page = LandingPage {
        ctx: PageContext::new(&req, user.0),
    };
    Ok(render(&page, &page.ctx)?)
}

/// Renders the sign up form.
pub async fn register_form(req: HttpRequest, user: CurrentUser) -> Result<HttpResponse> {
    let page = RegisterPage {
        ctx: PageContext::new(&req, user.0),
    };
    Ok(render(&page, &page.ctx)?)
}

/// Creates an account, logs it in and greets the new user.
pub async fn register(
    state: web::Data<AppState>,
    request: web::Form<RegisterRequest>,
) -> Result<HttpResponse> {
    validate_form(&*request).or_redirect("/register")?;

    let user = state.auth.register(&request).await.or_redirect("/register")?;
    let session = SessionUser::from(&user);
    let token = state.tokens.issue(&session).or_redirect("/register")?;

    let mut response = redirect(
        "/campgrounds",
        Some(Flash::success(format!("Welcome to YelpCamp {}", user.username))),
    );
    response.add_cookie(&session_cookie(token))?;
    Ok(response)
}

/// Renders the login form.
pub async fn login_form(req: HttpRequest, user: CurrentUser) -> Result<HttpResponse> {
    let page = LoginPage {
        ctx: PageContext::new(&req, user.0),
    };
    Ok(render(&page, &page.ctx)?)
}

/// Checks credentials and starts a session.
pub async fn login(
    state: web::Data<AppState>,
    request: web::Form<LoginRequest>,
) -> Result<HttpResponse> {
    validate_form(&*request).or_redirect("/login")?;

    let user = state
        .auth
        .verify_password(&request)
        .await
        .or_redirect("/login")?;
    let token = state
        .tokens
        .issue(&SessionUser::from(&user))
        .or_redirect("/login")?;

    log::info!("{} logged in", user.username);
    let mut response = redirect("/campgrounds", None);
    response.add_cookie(&session_cookie(token))?;
    Ok(response)
}

/// Ends the session.
pub async fn logout(user: CurrentUser) -> Result<HttpResponse> {
    if let Some(user) = user.0 {
        log::info!("{} logged out", user.username);
    }

    let mut response = redirect("/campgrounds", Some(Flash::success("Logged you out!")));
    response.add_cookie(&session_removal_cookie())?;
    Ok(response)
}
