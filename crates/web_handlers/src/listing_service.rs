use std::sync::Arc;
use uuid::Uuid;

use campgrounds::{
    Author, Campground, CampgroundChanges, CampgroundImage, CampgroundStore, NewCampground,
};
use image_hosting::{ImageCleanup, ImageError, ImageHost, ImageUpload, is_allowed_image, release};

use crate::error::AppError;
use crate::forms::{CampgroundDetails, validate_form};

/// Result of a change that may have left a hosted image behind.
#[derive(Debug)]
pub struct Outcome<T> {
    /// The persisted value
    pub value: T,
    /// What happened to the image the change replaced or orphaned
    pub image_cleanup: ImageCleanup,
}

impl<T> Outcome<T> {
    /// Appends a note about a failed image cleanup to a success message.
    pub fn describe(&self, message: &str) -> String {
        match &self.image_cleanup {
            ImageCleanup::Failed { image_id, .. } => format!(
                "{} The previous image ({}) could not be removed from the image host.",
                message, image_id
            ),
            _ => message.to_string(),
        }
    }
}

/// Campground writes that span the store and the image host.
#[derive(Clone)]
pub struct CampgroundService {
    store: Arc<dyn CampgroundStore>,
    images: Arc<dyn ImageHost>,
}

impl CampgroundService {
    /// Creates a service over a store and an image host.
    pub fn new(store: Arc<dyn CampgroundStore>, images: Arc<dyn ImageHost>) -> Self {
        Self { store, images }
    }

    /// The underlying store, for reads.
    pub fn store(&self) -> &dyn CampgroundStore {
        self.store.as_ref()
    }

    /// Creates a listing. Either an uploaded file or an image URL is required.
    pub async fn create(
        &self,
        details: CampgroundDetails,
        upload: Option<ImageUpload>,
        author: Author,
    ) -> Result<Campground, AppError> {
        validate_form(&details)?;
        let image = self
            .resolve_image(details.image_url.as_deref(), upload)
            .await?
            .ok_or_else(|| {
                AppError::Validation("An image file or image URL is required".to_string())
            })?;

        let host_id = image.host_id.clone();
        let created = self
            .store
            .insert_campground(NewCampground {
                name: details.name,
                price: details.price,
                description: details.description,
                image,
                author,
            })
            .await;

        match created {
            Ok(campground) => {
                log::info!(
                    "Campground {} created by {}",
                    campground.id,
                    campground.author.username
                );
                Ok(campground)
            }
            Err(e) => {
                release(self.images.as_ref(), host_id.as_deref()).await;
                Err(e.into())
            }
        }
    }

    /// Updates a listing. A replacement image is uploaded before the store is
    /// touched and the previous hosted image is released after.
    pub async fn update(
        &self,
        existing: &Campground,
        details: CampgroundDetails,
        upload: Option<ImageUpload>,
    ) -> Result<Outcome<Campground>, AppError> {
        validate_form(&details)?;
        let image = self
            .resolve_image(details.image_url.as_deref(), upload)
            .await?;
        let new_host_id = image.as_ref().and_then(|i| i.host_id.clone());
        let replaces_image = image.is_some();

        let updated = self
            .store
            .update_campground(
                &existing.id,
                CampgroundChanges {
                    name: details.name,
                    price: details.price,
                    description: details.description,
                    image,
                },
            )
            .await;

        let campground = match updated {
            Ok(campground) => campground,
            Err(e) => {
                release(self.images.as_ref(), new_host_id.as_deref()).await;
                return Err(e.into());
            }
        };

        let image_cleanup = if replaces_image {
            release(self.images.as_ref(), existing.image.host_id.as_deref()).await
        } else {
            ImageCleanup::NotNeeded
        };

        log::info!("Campground {} updated", campground.id);
        Ok(Outcome {
            value: campground,
            image_cleanup,
        })
    }

    /// Deletes a listing and its comments, then releases its hosted image.
    pub async fn delete(&self, id: &Uuid) -> Result<Outcome<Campground>, AppError> {
        let campground = self.store.delete_campground(id).await?;
        let image_cleanup = release(self.images.as_ref(), campground.image.host_id.as_deref()).await;

        log::info!("Campground {} deleted", campground.id);
        Ok(Outcome {
            value: campground,
            image_cleanup,
        })
    }

    async fn resolve_image(
        &self,
        image_url: Option<&str>,
        upload: Option<ImageUpload>,
    ) -> Result<Option<CampgroundImage>, AppError> {
        if let Some(upload) = upload {
            if !is_allowed_image(&upload.file_name) {
                return Err(ImageError::UnsupportedFile.into());
            }
            let hosted = self.images.upload(upload).await?;
            return Ok(Some(CampgroundImage {
                url: hosted.url,
                host_id: Some(hosted.public_id),
            }));
        }

        match image_url {
            Some(url) if is_web_url(url) => Ok(Some(CampgroundImage {
                url: url.to_string(),
                host_id: None,
            })),
            Some(_) => Err(AppError::Validation(
                "Image URL must start with http:// or https://".to_string(),
            )),
            None => Ok(None),
        }
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")) && !url.contains(char::is_whitespace)
}
