/// Errors raised by the image host.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// No credentials were configured for the image host.
    #[error("Image hosting is not configured")]
    NotConfigured,

    /// The uploaded file is not one of the accepted image types.
    #[error("Only image files are allowed!")]
    UnsupportedFile,

    /// The HTTP call to the image host failed.
    #[error("Image host request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The image host answered with an error.
    #[error("Image host error: {0}")]
    Api(String),
}

/// A file received from a form, ready to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name as sent by the browser
    pub file_name: String,
    /// Declared MIME type, if any
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

/// An image stored on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    /// Public HTTPS URL of the image
    pub url: String,
    /// Opaque host identifier used to delete the image later
    pub public_id: String,
}

/// Result of removing a hosted image after the local change was made.
///
/// The local change is never rolled back; `Failed` leaves an orphaned remote
/// image that has to be reconciled by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCleanup {
    /// There was no hosted image to remove.
    NotNeeded,
    /// The hosted image was removed.
    Removed,
    /// The hosted image is still on the host.
    Failed {
        /// Host identifier of the orphaned image
        image_id: String,
        /// Why the removal failed
        reason: String,
    },
}

impl ImageCleanup {
    /// Whether a hosted image was left behind.
    pub fn is_failed(&self) -> bool {
        matches!(self, ImageCleanup::Failed { .. })
    }
}

/// Accepts `jpg`, `jpeg`, `png` and `gif` file names, case-insensitively.
pub fn is_allowed_image(file_name: &str) -> bool {
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return false;
    };
    matches!(
        extension.to_ascii_lowercase().as_str(),
        "jpg" | "jpeg" | "png" | "gif"
    )
}
