use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use reviewscope::api;
use reviewscope::config::AppConfig;
use reviewscope::core::ReviewScope;
use reviewscope::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().await?;

    // Initialize logging
    init_logging(&config.logging)?;

    info!("Starting ReviewScope v{}", env!("CARGO_PKG_VERSION"));

    let host = config.api.host.clone();
    let port = config.api.port;
    let enable_cors = config.api.enable_cors;

    // Initialize the core application
    let app = Arc::new(ReviewScope::new(config)?);
    info!("Core application initialized");

    info!("Listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = if enable_cors {
            Cors::permissive()
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(app.clone()))
            .configure(api::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    info!("ReviewScope shutting down");
    Ok(())
}
