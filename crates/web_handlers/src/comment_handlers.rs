use actix_web::{HttpRequest, HttpResponse, Result, web};

use auth_services::flash::{Flash, redirect};
use auth_services::middleware::AuthenticatedUser;
use campgrounds::{Author, NewComment};

use crate::error::OrRedirect;
use crate::forms::{CommentForm, validate_form};
use crate::guards::{find_campground, owned_comment};
use crate::state::AppState;
use crate::templates::{EditCommentPage, NewCommentPage, PageContext, render};

const INDEX: &str = "/campgrounds";

fn campground_page(id: impl std::fmt::Display) -> String {
    format!("/campgrounds/{}", id)
}

/// Renders the new comment form.
pub async fn new_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let campground = find_campground(state.listings.store(), &path)
        .await
        .or_back(&req, INDEX)?;

    let page = NewCommentPage {
        ctx: PageContext::new(&req, Some(user.0)),
        campground,
    };
    Ok(render(&page, &page.ctx)?)
}

/// Posts a comment and appends it to the campground's list.
pub async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse> {
    let store = state.listings.store();
    let campground = find_campground(store, &path)
        .await
        .or_back(&req, INDEX)?;
    validate_form(&*form).or_back(&req, &campground_page(campground.id))?;

    let comment = store
        .add_comment(
            &campground.id,
            NewComment {
                text: form.into_inner().text,
                author: Author::from(&user.0),
            },
        )
        .await
        .or_back(&req, &campground_page(campground.id))?;

    log::info!(
        "{} commented on campground {}",
        comment.author.username,
        campground.id
    );
    Ok(redirect(
        &campground_page(campground.id),
        Some(Flash::success("Successfully added comment")),
    ))
}

/// Renders the edit form for the comment's author.
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (campground_id, comment_id) = path.into_inner();
    let (campground, comment) =
        owned_comment(state.listings.store(), &campground_id, &comment_id, &user.0)
            .await
            .or_back(&req, INDEX)?;

    let page = EditCommentPage {
        ctx: PageContext::new(&req, Some(user.0)),
        campground,
        comment,
    };
    Ok(render(&page, &page.ctx)?)
}

/// Applies the edit form.
pub async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse> {
    let (campground_id, comment_id) = path.into_inner();
    let store = state.listings.store();
    let (campground, comment) = owned_comment(store, &campground_id, &comment_id, &user.0)
        .await
        .or_back(&req, INDEX)?;
    validate_form(&*form).or_back(&req, &campground_page(campground.id))?;

    store
        .update_comment(&comment.id, form.into_inner().text)
        .await
        .or_back(&req, &campground_page(campground.id))?;

    Ok(redirect(
        &campground_page(campground.id),
        Some(Flash::success("Comment updated")),
    ))
}

/// Deletes a comment and removes it from the campground's list.
pub async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (campground_id, comment_id) = path.into_inner();
    let store = state.listings.store();
    let (campground, comment) = owned_comment(store, &campground_id, &comment_id, &user.0)
        .await
        .or_back(&req, INDEX)?;

    store
        .delete_comment(&campground.id, &comment.id)
        .await
        .or_back(&req, &campground_page(campground.id))?;

    log::info!("Comment {} deleted from {}", comment.id, campground.id);
    Ok(redirect(
        &campground_page(campground.id),
        Some(Flash::success("Comment deleted")),
    ))
}
