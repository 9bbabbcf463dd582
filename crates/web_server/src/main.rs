//! Main entry point for the YelpCamp server.
//! Serves the campground pages and the static assets under `/public`.

use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use std::path::Path;

use auth_services::middleware::SessionMiddleware;
use web_handlers::{MethodOverride, configure};
use web_server::config::Config;
use web_server::{app_state, image_host, open_stores, seed};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Starting YelpCamp server...");

    let config = Config::from_env()?;
    let stores = open_stores(&config).await?;
    let images = image_host(&config)?;

    if config.seed_on_start {
        seed(&config, &stores).await?;
    }

    if !Path::new(&config.public_dir).exists() {
        log::warn!("Static directory {} does not exist", config.public_dir);
    }

    let state = app_state(&config, &stores, images);
    let public_dir = config.public_dir.clone();
    let (ip, port) = config.bind_address();
    log::info!("The YelpCamp server has started on http://{}:{}", ip, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(MethodOverride)
            .wrap(SessionMiddleware::new(state.tokens.clone()))
            .wrap(Logger::default())
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
            .service(Files::new("/public", &public_dir))
            .configure(configure)
    })
    .bind((ip, port))?
    .run()
    .await?;

    Ok(())
}
