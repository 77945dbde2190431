mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::geolocation::{GeoLocator, HttpGeoLocator};
use crate::services::mailer::{self, Mailer};
use crate::services::region_gate::RegionGate;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,catalog_backend=debug,sqlx=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url).await?;
    db::migrate(&db).await?;
    tracing::info!("database ready");

    let http = reqwest::Client::builder().build()?;
    let locator: Arc<dyn GeoLocator> = Arc::new(HttpGeoLocator::new(
        http.clone(),
        config.geo.providers.clone(),
        config.geo.timeout,
    ));
    let gate = web::Data::new(RegionGate::new(config.region.clone(), locator));
    let mailer: web::Data<Arc<dyn Mailer>> = web::Data::new(mailer::from_config(http, &config.mail));

    let addr = config.addr;
    let origins = config.cors_allowed_origins.clone();
    let prefix = config.api_prefix.clone();
    let db = web::Data::new(db);
    let config = web::Data::new(config);

    tracing::info!(%addr, prefix = %prefix, "starting server");

    HttpServer::new(move || {
        let cors = origins.iter().fold(
            Cors::default()
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600),
            |cors, origin| cors.allowed_origin(origin),
        );

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(gate.clone())
            .app_data(mailer.clone())
            .configure(routes::extractor_errors)
            .configure(|cfg| routes::configure_routes(cfg, &prefix))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
