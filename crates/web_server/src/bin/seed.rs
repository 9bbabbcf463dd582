//! Resets the database to the fixture campgrounds.

use web_server::config::Config;
use web_server::{open_stores, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    let stores = open_stores(&config).await?;
    for campground in seed(&config, &stores).await? {
        log::info!("{} ({} comments)", campground.name, campground.comment_ids.len());
    }

    Ok(())
}
