use actix_web::{HttpRequest, HttpResponse};
use askama::Template;

use auth_services::flash::{Flash, FlashKind};
use auth_services::policy::{Access, authorize};
use auth_services::types::SessionUser;
use campgrounds::{Campground, Comment};

use crate::error::AppError;

/// Values every page needs: the session user and the pending flash.
pub struct PageContext {
    /// The logged-in user, if any
    pub current_user: Option<SessionUser>,
    /// Pending error flash, empty when none
    pub error: String,
    /// Pending success flash, empty when none
    pub success: String,
    consumed_flash: bool,
}

impl PageContext {
    /// Collects the session user and consumes the pending flash.
    pub fn new(req: &HttpRequest, current_user: Option<SessionUser>) -> Self {
        let flash = Flash::from_request(req);
        let (mut error, mut success) = (String::new(), String::new());
        match &flash {
            Some(Flash {
                kind: FlashKind::Error,
                message,
            }) => error = message.clone(),
            Some(Flash {
                kind: FlashKind::Success,
                message,
            }) => success = message.clone(),
            None => {}
        }

        Self {
            current_user,
            error,
            success,
            consumed_flash: flash.is_some(),
        }
    }

    /// Whether someone is logged in.
    pub fn logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Username of the logged-in user, empty when anonymous.
    pub fn username(&self) -> &str {
        self.current_user
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("")
    }

    fn may_edit<R: auth_services::policy::Owned>(&self, resource: &R) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| authorize(user, resource) == Access::Allow)
    }
}

/// Renders a page and clears the flash it displayed.
pub fn render<T: Template>(page: &T, ctx: &PageContext) -> Result<HttpResponse, AppError> {
    let body = page.render()?;
    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if ctx.consumed_flash {
        response.cookie(Flash::removal_cookie());
    }
    Ok(response.body(body))
}

/// `GET /`
#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingPage {
    /// Shared page values
    pub ctx: PageContext,
}

/// `GET /register`
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    /// Shared page values
    pub ctx: PageContext,
}

/// `GET /login`
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    /// Shared page values
    pub ctx: PageContext,
}

/// `GET /campgrounds`
#[derive(Template)]
#[template(path = "campgrounds/index.html")]
pub struct CampgroundIndexPage {
    /// Shared page values
    pub ctx: PageContext,
    /// Every listing
    pub campgrounds: Vec<Campground>,
}

/// `GET /campgrounds/new`
#[derive(Template)]
#[template(path = "campgrounds/new.html")]
pub struct NewCampgroundPage {
    /// Shared page values
    pub ctx: PageContext,
}

/// `GET /campgrounds/{id}/edit`
#[derive(Template)]
#[template(path = "campgrounds/edit.html")]
pub struct EditCampgroundPage {
    /// Shared page values
    pub ctx: PageContext,
    /// Listing being edited
    pub campground: Campground,
}

/// A comment as shown under a campground.
pub struct CommentView {
    /// The comment
    pub comment: Comment,
    /// Whether the viewer gets edit and delete buttons
    pub can_edit: bool,
}

/// `GET /campgrounds/{id}`
#[derive(Template)]
#[template(path = "campgrounds/show.html")]
pub struct ShowCampgroundPage {
    /// Shared page values
    pub ctx: PageContext,
    /// Listing shown
    pub campground: Campground,
    /// Its comments in posting order
    pub comments: Vec<CommentView>,
    /// Whether the viewer gets edit and delete buttons
    pub can_edit: bool,
}

impl ShowCampgroundPage {
    /// Builds the page, deciding which edit controls the viewer gets.
    pub fn new(ctx: PageContext, campground: Campground, comments: Vec<Comment>) -> Self {
        let can_edit = ctx.may_edit(&campground);
        let comments = comments
            .into_iter()
            .map(|comment| CommentView {
                can_edit: ctx.may_edit(&comment),
                comment,
            })
            .collect();

        Self {
            ctx,
            campground,
            comments,
            can_edit,
        }
    }
}

/// `GET /campgrounds/{id}/comments/new`
#[derive(Template)]
#[template(path = "comments/new.html")]
pub struct NewCommentPage {
    /// Shared page values
    pub ctx: PageContext,
    /// Listing being commented on
    pub campground: Campground,
}

/// `GET /campgrounds/{id}/comments/{comment_id}/edit`
#[derive(Template)]
#[template(path = "comments/edit.html")]
pub struct EditCommentPage {
    /// Shared page values
    pub ctx: PageContext,
    /// Listing the comment belongs to
    pub campground: Campground,
    /// Comment being edited
    pub comment: Comment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use campgrounds::{Author, CampgroundImage};
    use chrono::Utc;
    use uuid::Uuid;

    fn user(is_admin: bool) -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "Moe".to_string(),
            is_admin,
        }
    }

    fn author_of(user: &SessionUser) -> Author {
        Author::from(user)
    }

    fn campground(author: Author) -> Campground {
        Campground {
            id: Uuid::new_v4(),
            name: "Springfield Gorge".to_string(),
            price: "5".to_string(),
            description: "Steep".to_string(),
            image: CampgroundImage {
                url: "https://example.com/gorge.jpg".to_string(),
                host_id: None,
            },
            author,
            comment_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn comment(author: Author) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            text: "Jumped it".to_string(),
            author,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn context_reads_the_pending_flash() {
        let req = TestRequest::default()
            .cookie(Flash::error("Campground not found").to_cookie())
            .to_http_request();
        let ctx = PageContext::new(&req, None);

        assert_eq!(ctx.error, "Campground not found");
        assert!(ctx.success.is_empty());
        assert!(!ctx.logged_in());
        assert_eq!(ctx.username(), "");
    }

    #[test]
    fn rendering_clears_a_displayed_flash() {
        let req = TestRequest::default()
            .cookie(Flash::success("Logged you out!").to_cookie())
            .to_http_request();
        let page = LoginPage {
            ctx: PageContext::new(&req, None),
        };

        let response = render(&page, &page.ctx).unwrap();
        let cleared = response
            .cookies()
            .any(|c| c.name() == auth_services::flash::FLASH_COOKIE && c.value().is_empty());
        assert!(cleared);
    }

    #[test]
    fn owners_get_edit_controls_and_strangers_do_not() {
        let moe = user(false);
        let barney = user(false);
        let req = TestRequest::default().to_http_request();

        let page = ShowCampgroundPage::new(
            PageContext::new(&req, Some(moe.clone())),
            campground(author_of(&moe)),
            vec![comment(author_of(&moe)), comment(author_of(&barney))],
        );

        assert!(page.can_edit);
        assert!(page.comments[0].can_edit);
        assert!(!page.comments[1].can_edit);
    }

    #[test]
    fn anonymous_viewers_get_no_edit_controls() {
        let moe = user(false);
        let req = TestRequest::default().to_http_request();

        let page = ShowCampgroundPage::new(
            PageContext::new(&req, None),
            campground(author_of(&moe)),
            vec![comment(author_of(&moe))],
        );

        assert!(!page.can_edit);
        assert!(!page.comments[0].can_edit);
        let html = page.render().unwrap();
        assert!(html.contains("Springfield Gorge"));
        assert!(html.contains("Jumped it"));
        assert!(!html.contains("_method=DELETE"));
    }

    #[test]
    fn admins_get_edit_controls_everywhere() {
        let moe = user(false);
        let req = TestRequest::default().to_http_request();

        let page = ShowCampgroundPage::new(
            PageContext::new(&req, Some(user(true))),
            campground(author_of(&moe)),
            Vec::new(),
        );

        assert!(page.can_edit);
    }
}
