use auth_services::policy::Owned;
use auth_services::types::SessionUser;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Snapshot of the user who created a campground or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Id of the authoring user
    pub id: Uuid,
    /// Username at the time of writing
    pub username: String,
}

impl From<&SessionUser> for Author {
    fn from(user: &SessionUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Image attached to a campground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampgroundImage {
    /// Public URL of the image
    pub url: String,
    /// Image host id, `None` for plain URLs that are not hosted by us
    pub host_id: Option<String>,
}

/// A campground listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campground {
    /// Unique identifier for the campground
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Price per night, free text
    pub price: String,
    /// Long description
    pub description: String,
    /// Listing image
    pub image: CampgroundImage,
    /// Who created the listing
    pub author: Author,
    /// Comment ids in the order they were posted
    pub comment_ids: Vec<Uuid>,
    /// When the listing was created
    pub created_at: DateTime<Utc>,
}

impl Owned for Campground {
    fn owner_id(&self) -> Uuid {
        self.author.id
    }
}

/// A comment on a campground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Unique identifier for the comment
    pub id: Uuid,
    /// Comment body
    pub text: String,
    /// Who wrote the comment
    pub author: Author,
    /// When the comment was posted
    pub created_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author.id
    }
}

/// Values for a new campground
#[derive(Debug, Clone)]
pub struct NewCampground {
    /// Display name
    pub name: String,
    /// Price per night
    pub price: String,
    /// Long description
    pub description: String,
    /// Listing image
    pub image: CampgroundImage,
    /// Creating user
    pub author: Author,
}

/// Editable fields of a campground; `image` is only replaced when set.
#[derive(Debug, Clone)]
pub struct CampgroundChanges {
    /// New display name
    pub name: String,
    /// New price
    pub price: String,
    /// New description
    pub description: String,
    /// Replacement image
    pub image: Option<CampgroundImage>,
}

/// Values for a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Comment body
    pub text: String,
    /// Posting user
    pub author: Author,
}

/// Errors raised by campground stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No campground with the requested id
    #[error("Campground not found")]
    CampgroundNotFound,

    /// No comment with the requested id
    #[error("Comment not found")]
    CommentNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
