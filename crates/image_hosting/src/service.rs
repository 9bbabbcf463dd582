use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::types::*;

/// An external service that stores campground images.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads an image and returns where it lives.
    async fn upload(&self, image: ImageUpload) -> Result<HostedImage, ImageError>;

    /// Deletes the image identified by `public_id`.
    async fn destroy(&self, public_id: &str) -> Result<(), ImageError>;
}

/// Removes a previously hosted image after the local change is persisted.
/// Failures are logged and reported, never propagated.
pub async fn release(host: &dyn ImageHost, image_id: Option<&str>) -> ImageCleanup {
    let Some(image_id) = image_id.filter(|id| !id.is_empty()) else {
        return ImageCleanup::NotNeeded;
    };

    match host.destroy(image_id).await {
        Ok(()) => ImageCleanup::Removed,
        Err(e) => {
            log::warn!("Orphaned hosted image {}: {}", image_id, e);
            ImageCleanup::Failed {
                image_id: image_id.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Credentials for the Cloudinary upload API.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    /// Cloud name the account lives under
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used to sign requests
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// Reads `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
    /// `CLOUDINARY_API_SECRET`. Returns `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            cloud_name: var("CLOUDINARY_CLOUD_NAME")?,
            api_key: var("CLOUDINARY_API_KEY")?,
            api_secret: var("CLOUDINARY_API_SECRET")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Cloudinary image upload API.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: Client,
    base_url: String,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    /// Creates a new Cloudinary client.
    pub fn new(config: CloudinaryConfig) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("https://api.cloudinary.com/v1_1/{}", config.cloud_name),
            config,
        })
    }

    /// Signs request parameters: SHA-1 over the `key=value` pairs sorted by
    /// key and joined with `&`, followed by the API secret.
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn error_from(response: reqwest::Response) -> ImageError {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => ImageError::Api(body.error.message),
            Err(_) => ImageError::Api(format!("unexpected status {}", status)),
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<HostedImage, ImageError> {
        if !is_allowed_image(&image.file_name) {
            return Err(ImageError::UnsupportedFile);
        }

        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(&[("timestamp", timestamp.as_str())], &self.config.api_secret);

        let mut file = Part::bytes(image.bytes).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            file = file.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        log::debug!("Uploading {} to Cloudinary", image.file_name);
        let response = self
            .client
            .post(format!("{}/image/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: UploadResponse = response.json().await?;
        log::info!("Uploaded image {}", body.public_id);
        Ok(HostedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), ImageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.to_string()),
            ("api_key", self.config.api_key.clone()),
            ("timestamp", timestamp),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(format!("{}/image/destroy", self.base_url))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                log::debug!("Image {} was already gone", public_id);
                Ok(())
            }
            other => Err(ImageError::Api(format!("destroy returned {}", other))),
        }
    }
}

/// Stand-in used when no image host credentials are configured.
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _image: ImageUpload) -> Result<HostedImage, ImageError> {
        Err(ImageError::NotConfigured)
    }

    async fn destroy(&self, _public_id: &str) -> Result<(), ImageError> {
        Err(ImageError::NotConfigured)
    }
}
