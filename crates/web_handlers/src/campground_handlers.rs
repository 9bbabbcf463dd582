use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Result, web};

use auth_services::flash::{Flash, redirect};
use auth_services::middleware::{AuthenticatedUser, CurrentUser};
use campgrounds::Author;

use crate::error::OrRedirect;
use crate::forms::CampgroundUpload;
use crate::guards::{find_campground, owned_campground};
use crate::state::AppState;
use crate::templates::*;

const INDEX: &str = "/campgrounds";

/// Lists every campground.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let campgrounds = state
        .listings
        .store()
        .list_campgrounds()
        .await
        .or_redirect("/")?;

    let page = CampgroundIndexPage {
        ctx: PageContext::new(&req, user.0),
        campgrounds,
    };
    Ok(render(&page, &page.ctx)?)
}

/// Renders the new campground form.
pub async fn new_form(req: HttpRequest, user: AuthenticatedUser) -> Result<HttpResponse> {
    let page = NewCampgroundPage {
        ctx: PageContext::new(&req, Some(user.0)),
    };
    Ok(render(&page, &page.ctx)?)
}

/// Creates a campground owned by the session user.
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    form: MultipartForm<CampgroundUpload>,
) -> Result<HttpResponse> {
    let (details, upload) = form.into_inner().into_parts();

    let campground = state
        .listings
        .create(details, upload, Author::from(&user.0))
        .await
        .or_back(&req, "/campgrounds/new")?;

    Ok(redirect(&format!("/campgrounds/{}", campground.id), None))
}

/// Shows a campground with its comments.
pub async fn show(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let store = state.listings.store();
    let campground = find_campground(store, &path)
        .await
        .or_back(&req, INDEX)?;
    let comments = store
        .comments_for(&campground)
        .await
        .or_back(&req, INDEX)?;

    let page = ShowCampgroundPage::new(PageContext::new(&req, user.0), campground, comments);
    Ok(render(&page, &page.ctx)?)
}

/// Renders the edit form for the owner.
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let campground = owned_campground(state.listings.store(), &path, &user.0)
        .await
        .or_back(&req, INDEX)?;

    let page = EditCampgroundPage {
        ctx: PageContext::new(&req, Some(user.0)),
        campground,
    };
    Ok(render(&page, &page.ctx)?)
}

/// Applies the edit form.
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    form: MultipartForm<CampgroundUpload>,
) -> Result<HttpResponse> {
    let existing = owned_campground(state.listings.store(), &path, &user.0)
        .await
        .or_back(&req, INDEX)?;
    let (details, upload) = form.into_inner().into_parts();

    let outcome = state
        .listings
        .update(&existing, details, upload)
        .await
        .or_back(&req, &format!("/campgrounds/{}/edit", existing.id))?;

    Ok(redirect(
        &format!("/campgrounds/{}", outcome.value.id),
        Some(Flash::success(outcome.describe("Successfully Updated!"))),
    ))
}

/// Deletes a campground, its comments and its hosted image.
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let campground = owned_campground(state.listings.store(), &path, &user.0)
        .await
        .or_back(&req, INDEX)?;

    let outcome = state
        .listings
        .delete(&campground.id)
        .await
        .or_back(&req, INDEX)?;

    Ok(redirect(
        INDEX,
        Some(Flash::success(
            outcome.describe("Campground deleted successfully!"),
        )),
    ))
}
