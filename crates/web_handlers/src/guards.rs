use uuid::Uuid;

use auth_services::policy::{Access, authorize};
use auth_services::types::SessionUser;
use campgrounds::{Campground, CampgroundStore, Comment, StoreError};

use crate::error::AppError;

/// Parses a path id. A malformed id is reported as `missing`, the same way a
/// well-formed id with no record would be.
pub fn parse_id(raw: &str, missing: StoreError) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Store(missing))
}

/// Loads a campground by its raw path id.
pub async fn find_campground(
    store: &dyn CampgroundStore,
    raw_id: &str,
) -> Result<Campground, AppError> {
    let id = parse_id(raw_id, StoreError::CampgroundNotFound)?;
    store
        .find_campground(&id)
        .await?
        .ok_or(AppError::Store(StoreError::CampgroundNotFound))
}

/// Loads a campground the user may mutate.
pub async fn owned_campground(
    store: &dyn CampgroundStore,
    raw_id: &str,
    user: &SessionUser,
) -> Result<Campground, AppError> {
    let campground = find_campground(store, raw_id).await?;
    match authorize(user, &campground) {
        Access::Allow => Ok(campground),
        Access::Deny => {
            log::warn!(
                "{} tried to modify campground {} owned by {}",
                user.username,
                campground.id,
                campground.author.username
            );
            Err(AppError::PermissionDenied)
        }
    }
}

/// Loads a comment the user may mutate, together with the campground it is
/// listed on. A comment listed on another campground counts as missing.
pub async fn owned_comment(
    store: &dyn CampgroundStore,
    raw_campground_id: &str,
    raw_comment_id: &str,
    user: &SessionUser,
) -> Result<(Campground, Comment), AppError> {
    let campground = find_campground(store, raw_campground_id).await?;
    let comment_id = parse_id(raw_comment_id, StoreError::CommentNotFound)?;
    if !campground.comment_ids.contains(&comment_id) {
        return Err(AppError::Store(StoreError::CommentNotFound));
    }

    let comment = store
        .find_comment(&comment_id)
        .await?
        .ok_or(AppError::Store(StoreError::CommentNotFound))?;

    match authorize(user, &comment) {
        Access::Allow => Ok((campground, comment)),
        Access::Deny => {
            log::warn!(
                "{} tried to modify comment {} owned by {}",
                user.username,
                comment.id,
                comment.author.username
            );
            Err(AppError::PermissionDenied)
        }
    }
}
