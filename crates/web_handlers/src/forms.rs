use actix_multipart::form::{MultipartForm, bytes::Bytes, text::Text};
use serde::Deserialize;
use validator::Validate;

use auth_services::types::{describe_validation_errors, not_blank};
use image_hosting::ImageUpload;

use crate::error::AppError;

/// Multipart body of the new and edit campground forms.
///
/// Every part is optional so that a missing field surfaces as a validation
/// flash rather than a bare 400.
#[derive(MultipartForm)]
pub struct CampgroundUpload {
    /// Display name
    pub name: Option<Text<String>>,
    /// Price per night
    pub price: Option<Text<String>>,
    /// Long description
    pub description: Option<Text<String>>,
    /// Plain image URL, used when no file is attached
    pub image_url: Option<Text<String>>,
    /// Image file
    #[multipart(limit = "10MB")]
    pub image: Option<Bytes>,
}

/// Text fields of a campground form.
#[derive(Debug, Clone, Validate)]
pub struct CampgroundDetails {
    /// Display name
    #[validate(
        custom(function = "not_blank", message = "Campground name is required"),
        length(max = 255, message = "Campground name must be at most 255 characters")
    )]
    pub name: String,
    /// Price per night
    #[validate(length(max = 32, message = "Price is too long"))]
    pub price: String,
    /// Long description
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: String,
    /// Plain image URL, if one was typed in
    pub image_url: Option<String>,
}

impl CampgroundUpload {
    /// Splits the form into its text fields and the attached file. An empty
    /// file part counts as no file.
    pub fn into_parts(self) -> (CampgroundDetails, Option<ImageUpload>) {
        let text = |field: Option<Text<String>>| {
            field
                .map(|t| t.into_inner().trim().to_string())
                .unwrap_or_default()
        };

        let details = CampgroundDetails {
            name: text(self.name),
            price: text(self.price),
            description: text(self.description),
            image_url: Some(text(self.image_url)).filter(|url| !url.is_empty()),
        };

        let upload = self.image.filter(|file| !file.data.is_empty()).map(|file| ImageUpload {
            file_name: file.file_name.unwrap_or_default(),
            content_type: file.content_type.map(|mime| mime.to_string()),
            bytes: file.data.to_vec(),
        });

        (details, upload)
    }
}

/// Body of the new and edit comment forms.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    /// Comment body
    #[validate(
        custom(function = "not_blank", message = "Comment text is required"),
        length(max = 2000, message = "Comment text must be at most 2000 characters")
    )]
    pub text: String,
}

/// Runs the form's validation rules, folding failures into one message.
pub fn validate_form<T: Validate>(form: &T) -> Result<(), AppError> {
    form.validate()
        .map_err(|e| AppError::Validation(describe_validation_errors(&e)))
}
