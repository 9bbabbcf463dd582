//! # YelpCamp server bootstrap
//!
//! Configuration loading and service wiring shared by the `web_server` and
//! `seed` binaries.

/// Environment configuration
pub mod config;

use anyhow::Context;
use std::sync::Arc;

use auth_services::jwt::SessionTokens;
use auth_services::service::AuthService;
use auth_services::store::{MemoryUserStore, PgUserStore, UserStore};
use auth_services::types::{AuthError, RegisterRequest};
use campgrounds::seed::{SEED_AUTHOR, seed_database};
use campgrounds::{Author, Campground, CampgroundStore, MemoryCampgroundStore, PgCampgroundStore};
use image_hosting::{CloudinaryClient, DisabledImageHost, ImageHost};
use postgres::database::{create_connection_pool, run_migrations, test_connection};
use web_handlers::{AppState, CampgroundService};

use crate::config::{Config, Storage};

/// The stores the application runs on.
#[derive(Clone)]
pub struct Stores {
    /// User accounts
    pub users: Arc<dyn UserStore>,
    /// Campgrounds and comments
    pub campgrounds: Arc<dyn CampgroundStore>,
}

/// Opens the configured storage, applying the schema when it is Postgres.
pub async fn open_stores(config: &Config) -> anyhow::Result<Stores> {
    match config.storage {
        Storage::Memory => {
            log::warn!("Using in-memory storage, data is lost on restart");
            Ok(Stores {
                users: Arc::new(MemoryUserStore::new()),
                campgrounds: Arc::new(MemoryCampgroundStore::new()),
            })
        }
        Storage::Postgres => {
            let pool = create_connection_pool(&config.database_url)
                .await
                .context("Failed to create database pool")?;
            test_connection(&pool)
                .await
                .context("Database connection test failed")?;
            run_migrations(&pool)
                .await
                .context("Failed to apply the database schema")?;
            log::info!("Database ready");

            Ok(Stores {
                users: Arc::new(PgUserStore::new(pool.clone())),
                campgrounds: Arc::new(PgCampgroundStore::new(pool)),
            })
        }
    }
}

/// The image host for the configured credentials.
pub fn image_host(config: &Config) -> anyhow::Result<Arc<dyn ImageHost>> {
    match &config.cloudinary {
        Some(cloudinary) => {
            log::info!("Uploading images to Cloudinary cloud {}", cloudinary.cloud_name);
            Ok(Arc::new(
                CloudinaryClient::new(cloudinary.clone())
                    .context("Failed to build the Cloudinary client")?,
            ))
        }
        None => {
            log::warn!("Cloudinary is not configured, image uploads are disabled");
            Ok(Arc::new(DisabledImageHost))
        }
    }
}

/// Wires the handler state.
pub fn app_state(config: &Config, stores: &Stores, images: Arc<dyn ImageHost>) -> AppState {
    AppState {
        auth: AuthService::new(stores.users.clone(), config.admin_code.clone()),
        listings: CampgroundService::new(stores.campgrounds.clone(), images),
        tokens: SessionTokens::new(&config.session_secret),
    }
}

/// Replaces all listings with the fixtures, creating the fixture user first
/// if it does not exist yet.
pub async fn seed(config: &Config, stores: &Stores) -> anyhow::Result<Vec<Campground>> {
    let user = match stores.users.find_by_username(SEED_AUTHOR).await? {
        Some(user) => user,
        None => {
            let auth = AuthService::new(stores.users.clone(), None);
            match auth
                .register(&RegisterRequest {
                    username: SEED_AUTHOR.to_string(),
                    password: config.fixture_password(),
                    admin_code: None,
                })
                .await
            {
                Ok(user) => user,
                Err(AuthError::UsernameTaken) => stores
                    .users
                    .find_by_username(SEED_AUTHOR)
                    .await?
                    .context("Fixture user vanished while seeding")?,
                Err(e) => return Err(e.into()),
            }
        }
    };

    let author = Author {
        id: user.id,
        username: user.username,
    };
    let seeded = seed_database(stores.campgrounds.as_ref(), &author).await?;
    log::info!("Seeded {} campgrounds", seeded.len());
    Ok(seeded)
}
