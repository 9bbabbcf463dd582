use anyhow::{Context, bail};

use image_hosting::CloudinaryConfig;
use postgres::database::DEFAULT_DATABASE_URL;

const DEV_SESSION_SECRET: &str = "yelpcamp-development-secret";
const DEV_SEED_PASSWORD: &str = "password";

/// Where campgrounds, comments and users are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// PostgreSQL at `DATABASE_URL`
    Postgres,
    /// Process memory, lost on restart
    Memory,
}

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string
    pub database_url: String,
    /// Storage backend
    pub storage: Storage,
    /// Listen address
    pub ip: String,
    /// Listen port
    pub port: u16,
    /// Secret the session tokens are signed with
    pub session_secret: String,
    /// Code that makes a registration an admin
    pub admin_code: Option<String>,
    /// Directory served under `/public`
    pub public_dir: String,
    /// Whether to reseed the fixture campgrounds at boot
    pub seed_on_start: bool,
    /// Password for the fixture user, see [`Config::fixture_password`]
    pub seed_password: Option<String>,
    /// Image host credentials, `None` disables uploads
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::from_lookup(|name| std::env::var(name).ok())?;
        config.cloudinary = CloudinaryConfig::from_env();
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let storage = match var("STORAGE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("postgres") => Storage::Postgres,
            Some("memory") => Storage::Memory,
            Some(other) => bail!("STORAGE must be `postgres` or `memory`, got `{}`", other),
        };

        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?,
            None => 5000,
        };

        let session_secret = var("SESSION_SECRET").unwrap_or_else(|| {
            log::warn!("SESSION_SECRET is not set, using the development secret");
            DEV_SESSION_SECRET.to_string()
        });

        let seed_on_start = var("SEED_ON_START")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            storage,
            ip: var("IP").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            session_secret,
            admin_code: var("ADMIN_CODE"),
            public_dir: var("PUBLIC_DIR").unwrap_or_else(|| "./public".to_string()),
            seed_on_start,
            seed_password: var("SEED_PASSWORD"),
            cloudinary: None,
        })
    }

    /// Password the seeder gives a newly created fixture user. Falls back
    /// to the development password with a warning.
    pub fn fixture_password(&self) -> String {
        self.seed_password.clone().unwrap_or_else(|| {
            log::warn!("SEED_PASSWORD is not set, using the development password");
            DEV_SEED_PASSWORD.to_string()
        })
    }

    /// `ip:port` to bind.
    pub fn bind_address(&self) -> (String, u16) {
        (self.ip.clone(), self.port)
    }
}
